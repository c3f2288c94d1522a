use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{response::Envelope, ship::ShipRef},
    services::{
        capacity_service::{CabinAvailability, CapacityEstimator},
        ship_resolver::ShipResolver,
    },
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    ship_id: Option<i64>,
    ship_name: Option<String>,
    route: Option<String>,
}

#[derive(Serialize)]
struct AvailabilityReport {
    ship_id: Option<i64>,
    ship_name: String,
    route: String,
    total_passenger_capacity: u32,
    cabin_availability: Vec<CabinAvailability>,
}

/// GET /api/cabin-availability
pub async fn get_cabin_availability(
    store: web::Data<dyn CruiseStore>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, CruiseError> {
    let query = query.into_inner();
    let missing = || {
        CruiseError::Validation(
            "Ship identifier (ship_id or ship_name) and route are required".into(),
        )
    };
    let reference =
        ShipRef::from_parts(query.ship_id, query.ship_name.as_deref()).ok_or_else(missing)?;
    let route = query
        .route
        .as_deref()
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .ok_or_else(missing)?;

    let store = store.get_ref();
    let ship = ShipResolver::resolve(store, &reference).await?;
    // capacity comes from the ship record, a bare name is not enough
    let passenger_count = ship
        .passenger_count
        .ok_or_else(|| CruiseError::ShipNotFound(reference.to_string()))?;
    let cabin_availability =
        CapacityEstimator::estimate(store, &ship, route, passenger_count).await?;

    Ok(HttpResponse::Ok().json(Envelope::ok(AvailabilityReport {
        ship_id: ship.id,
        ship_name: ship.name,
        route: route.to_string(),
        total_passenger_capacity: passenger_count,
        cabin_availability,
    })))
}

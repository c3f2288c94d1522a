use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        passenger::{AddPassengersRequest, CreatePassengerRequest, ShipGuard},
        response::Envelope,
    },
    services::passenger_service::PassengerService,
};

#[derive(Serialize)]
struct PassengerCreated {
    id: i64,
}

#[derive(Serialize)]
struct PassengersAdded {
    ids: Vec<i64>,
}

/// POST /api/passengers
pub async fn create_passenger(
    store: web::Data<dyn CruiseStore>,
    input: web::Json<CreatePassengerRequest>,
) -> Result<HttpResponse, CruiseError> {
    let id = PassengerService::create(store.get_ref(), input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(PassengerCreated { id }).with_message("Passenger created")))
}

/// POST /api/passengers/batch
pub async fn add_passengers(
    store: web::Data<dyn CruiseStore>,
    input: web::Json<AddPassengersRequest>,
) -> Result<HttpResponse, CruiseError> {
    let ids = PassengerService::add_batch(store.get_ref(), input.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .json(Envelope::ok(PassengersAdded { ids }).with_message("Passengers added successfully")))
}

/// DELETE /api/passengers/{id}
pub async fn delete_passenger(
    store: web::Data<dyn CruiseStore>,
    path: web::Path<i64>,
    guard: web::Query<ShipGuard>,
) -> Result<HttpResponse, CruiseError> {
    let deleted =
        PassengerService::delete(store.get_ref(), path.into_inner(), &guard.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .json(Envelope::ok(deleted).with_message("Passenger deleted successfully")))
}

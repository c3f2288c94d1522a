use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        pricing::{PricingFilter, PricingListing},
        response::Envelope,
        room_type::RoomType,
        ship::ShipRef,
    },
    services::{
        pricing_service::{AddPricingRequest, GuestBreakdown, PricingService, PricingSource},
        ship_resolver::ShipResolver,
    },
};

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    ship_id: Option<i64>,
    ship_name: Option<String>,
    route: Option<String>,
    room_type: Option<String>,
    number_of_guests: Option<u32>,
    adults: Option<u32>,
    children: Option<u32>,
}

#[derive(Serialize)]
struct RoomQuote {
    ship_id: Option<i64>,
    ship_name: String,
    route: String,
    room_type: RoomType,
    base_price_per_person: f64,
    number_of_guests: u32,
    trip_duration_days: u32,
    total_amount: f64,
    pricing_source: PricingSource,
}

#[derive(Serialize)]
struct RoomTotal {
    price_per_person: f64,
    total_for_guests: f64,
}

#[derive(Serialize)]
struct AllRoomPrices {
    ship_id: Option<i64>,
    ship_name: String,
    route: String,
    pricing: BTreeMap<&'static str, RoomTotal>,
    number_of_guests: u32,
    pricing_source: PricingSource,
}

/// GET /api/pricing
pub async fn get_pricing(
    store: web::Data<dyn CruiseStore>,
    query: web::Query<PricingQuery>,
) -> Result<HttpResponse, CruiseError> {
    let query = query.into_inner();
    let reference = ShipRef::from_parts(query.ship_id, query.ship_name.as_deref()).ok_or_else(
        || CruiseError::Validation("Either ship_id or ship_name parameter is required".into()),
    )?;
    let route = query
        .route
        .as_deref()
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .ok_or_else(|| CruiseError::Validation("route parameter is required".into()))?;

    let store = store.get_ref();
    let ship = ShipResolver::resolve(store, &reference).await?;
    let guests = GuestBreakdown::new(
        query.adults.unwrap_or(0),
        query.children.unwrap_or(0),
        query.number_of_guests.unwrap_or(1),
    );

    match query.room_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(room_type) => {
            let room_type: RoomType = room_type.parse()?;
            let (quote, pricing_source) =
                PricingService::quote(store, &ship, route, room_type, &guests).await?;
            Ok(HttpResponse::Ok().json(Envelope::ok(RoomQuote {
                ship_id: ship.id,
                ship_name: ship.name,
                route: route.to_string(),
                room_type,
                base_price_per_person: quote.base_price_per_person,
                number_of_guests: quote.number_of_guests,
                trip_duration_days: quote.trip_duration_days,
                total_amount: quote.total_amount,
                pricing_source,
            })))
        }
        None => {
            let (prices, pricing_source) = PricingService::all_prices(store, &ship, route).await?;
            let pricing = RoomType::ALL
                .iter()
                .map(|room_type| {
                    let price = prices.get(*room_type);
                    (
                        room_type.key(),
                        RoomTotal {
                            price_per_person: price,
                            total_for_guests: price * guests.number_of_guests as f64,
                        },
                    )
                })
                .collect();
            Ok(HttpResponse::Ok().json(Envelope::ok(AllRoomPrices {
                ship_id: ship.id,
                ship_name: ship.name,
                route: route.to_string(),
                pricing,
                number_of_guests: guests.number_of_guests,
                pricing_source,
            })))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogueQuery {
    ship_id: Option<i64>,
    ship: Option<String>,
    route: Option<String>,
    #[serde(rename = "minPrice")]
    min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    max_price: Option<f64>,
}

impl From<CatalogueQuery> for PricingFilter {
    fn from(query: CatalogueQuery) -> Self {
        let text = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        PricingFilter {
            ship_id: query.ship_id.filter(|id| *id > 0),
            ship_name: text(query.ship),
            route: text(query.route),
            min_price: query.min_price.unwrap_or(0.0),
            max_price: query.max_price.unwrap_or(0.0),
        }
    }
}

#[derive(Serialize)]
struct Catalogue {
    pricing: Vec<PricingListing>,
    filters_applied: PricingFilter,
}

/// GET /api/cabin-pricing
pub async fn search_cabin_pricing(
    store: web::Data<dyn CruiseStore>,
    query: web::Query<CatalogueQuery>,
) -> Result<HttpResponse, CruiseError> {
    let filter = PricingFilter::from(query.into_inner());
    let pricing = store.search_pricing(&filter).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(Catalogue {
        pricing,
        filters_applied: filter,
    })))
}

#[derive(Serialize)]
struct PricingAdded {
    ship_id: i64,
}

/// POST /api/cabin-pricing
pub async fn add_cabin_pricing(
    store: web::Data<dyn CruiseStore>,
    input: web::Json<AddPricingRequest>,
) -> Result<HttpResponse, CruiseError> {
    let ship_id = PricingService::add_pricing(store.get_ref(), input.into_inner()).await?;
    info!("Pricing added for ship {}", ship_id);
    Ok(HttpResponse::Ok()
        .json(Envelope::ok(PricingAdded { ship_id }).with_message("Pricing added successfully.")))
}

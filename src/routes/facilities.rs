use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{facility::FacilityBookingRequest, response::Envelope},
    services::{
        facility_service::{FacilityPreferenceSummary, FacilityPrice, FacilityService},
        mail_service::Mailer,
    },
};

#[derive(Serialize)]
struct FacilityPriceList {
    facilities: Vec<FacilityPrice>,
}

#[derive(Serialize)]
struct FacilityPreferenceBody {
    preference: FacilityPreferenceSummary,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceQuery {
    booking_id: Option<i64>,
}

/// GET /api/facilities
pub async fn list_facilities(
    store: web::Data<dyn CruiseStore>,
) -> Result<HttpResponse, CruiseError> {
    let facilities = FacilityService::price_list(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(FacilityPriceList { facilities })))
}

/// POST /api/facilities/bookings
pub async fn process_facility_booking(
    store: web::Data<dyn CruiseStore>,
    mailer: web::Data<dyn Mailer>,
    input: web::Json<FacilityBookingRequest>,
) -> Result<HttpResponse, CruiseError> {
    let outcome =
        FacilityService::process(store.get_ref(), mailer.get_ref(), input.into_inner()).await?;
    let message = outcome.message.clone();
    Ok(HttpResponse::Ok().json(Envelope::ok(outcome).with_message(message)))
}

/// GET /api/facilities/preferences?booking_id=
pub async fn get_facility_preferences(
    store: web::Data<dyn CruiseStore>,
    query: web::Query<PreferenceQuery>,
) -> Result<HttpResponse, CruiseError> {
    let booking_id = query
        .booking_id
        .filter(|id| *id > 0)
        .ok_or_else(|| CruiseError::Validation("Booking ID is required".to_string()))?;

    let preference =
        FacilityService::preferences(store.get_ref(), booking_id, Utc::now().date_naive()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(FacilityPreferenceBody { preference })))
}

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::room_type::RoomType;

#[derive(Error, Debug)]
pub enum CruiseError {
    #[error("Ship not found: {0}")]
    ShipNotFound(String),

    #[error("Invalid room type: '{0}'. Valid types: {valid}", valid = RoomType::valid_labels())]
    InvalidRoomType(String),

    #[error("Pricing not found for this ship and route combination")]
    PricingNotFound,

    /// The booking row was written but its cabin-management record was not,
    /// so the whole booking was rolled back.
    #[error("Booking {booking_id} was rolled back because its cabin record could not be saved: {reason}")]
    PartialBookingFailure { booking_id: i64, reason: String },

    #[error("Card expiry must be in MM/YY format (e.g., 12/25)")]
    InvalidCardExpiry,

    #[error("Card expiry date must be in the future. Your card expired on {0}")]
    CardExpired(String),

    #[error("No free {room_type} cabin number left on {ship_name} after {attempts} attempts")]
    CabinNumberExhausted {
        ship_name: String,
        room_type: RoomType,
        attempts: usize,
    },

    #[error(
        "You have already paid for the following facilities: {}. Please select different facilities.",
        .0.join(", ")
    )]
    FacilitiesAlreadyPaid(Vec<String>),

    #[error("You have pending facility bookings totaling ${0:.2}. Please complete payment for existing bookings before adding new facilities.")]
    PendingFacilityBalance(f64),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<mongodb::error::Error> for CruiseError {
    fn from(err: mongodb::error::Error) -> Self {
        CruiseError::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for CruiseError {
    fn from(err: bson::ser::Error) -> Self {
        CruiseError::Database(err.to_string())
    }
}

impl ResponseError for CruiseError {
    fn status_code(&self) -> StatusCode {
        match self {
            CruiseError::ShipNotFound(_) | CruiseError::PricingNotFound | CruiseError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CruiseError::InvalidRoomType(_)
            | CruiseError::InvalidCardExpiry
            | CruiseError::CardExpired(_)
            | CruiseError::Validation(_) => StatusCode::BAD_REQUEST,
            CruiseError::CabinNumberExhausted { .. }
            | CruiseError::FacilitiesAlreadyPaid(_)
            | CruiseError::PendingFacilityBalance(_) => StatusCode::CONFLICT,
            CruiseError::Mail(_) => StatusCode::BAD_GATEWAY,
            CruiseError::PartialBookingFailure { .. } | CruiseError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });
        match self {
            CruiseError::PartialBookingFailure { booking_id, reason } => {
                body["booking_id"] = json!(booking_id);
                body["cabin_management"] = json!({ "success": false, "error": reason });
            }
            CruiseError::FacilitiesAlreadyPaid(names) => {
                body["already_paid_facilities"] = json!(names);
            }
            CruiseError::PendingFacilityBalance(amount) => {
                body["pending_amount"] = json!(amount);
                body["action_required"] = json!("complete_payment");
            }
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

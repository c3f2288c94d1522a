use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        bookings::{BookingRequest, NewBooking, NewCabinRecord},
        room_type::RoomType,
    },
    services::{
        cabin_number::assign_cabin_number,
        card_expiry::validate_card_expiry,
        pricing_service::{GuestBreakdown, PriceQuote, PricingService},
        ship_resolver::ShipResolver,
    },
};

pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: full_name, email, room_type, ship_identifier, destination";

const DEFAULT_GENDER: &str = "Male";
const DEFAULT_CARD_TYPE: &str = "Visa";
const DEFAULT_CARD_NUMBER: &str = "0000000000000000";

#[derive(Debug, Clone, Serialize)]
pub struct CabinManagementStatus {
    pub success: bool,
    pub cabin_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub booking_id: i64,
    pub cabin_number: String,
    pub pricing_details: PriceQuote,
    pub cabin_management: CabinManagementStatus,
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn or_default(value: &Option<String>, default: &str) -> String {
    present(value).unwrap_or(default).to_string()
}

pub struct BookingService;

impl BookingService {
    /// Validates, prices and stores a booking together with its
    /// cabin-management record.
    pub async fn create(
        store: &dyn CruiseStore,
        request: BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<BookingConfirmation, CruiseError> {
        let (Some(full_name), Some(email), Some(room_type), Some(ship_ref), Some(destination)) = (
            present(&request.full_name),
            present(&request.email),
            present(&request.room_type),
            request.ship_ref(),
            present(&request.destination),
        ) else {
            return Err(CruiseError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        };

        let ship = ShipResolver::resolve(store, &ship_ref).await?;

        if let Some(expiry) = present(&request.card_expiry) {
            validate_card_expiry(expiry, now)?;
        }

        let room_type: RoomType = room_type.parse()?;
        let guests = GuestBreakdown::new(
            request.adults.unwrap_or(0),
            request.children.unwrap_or(0),
            request.number_of_guests.unwrap_or(1),
        );
        let (quote, source) =
            PricingService::quote(store, &ship, destination, room_type, &guests).await?;

        let cabin_number = match present(&request.cabin_number) {
            Some(number) => number.to_string(),
            None => assign_cabin_number(store, &ship.name, room_type).await?,
        };

        let booking = NewBooking {
            full_name: full_name.to_string(),
            gender: or_default(&request.gender, DEFAULT_GENDER),
            email: email.to_string(),
            citizenship: or_default(&request.citizenship, ""),
            age: request.age.unwrap_or(0),
            room_type,
            cabin_number: cabin_number.clone(),
            adults: guests.adults,
            children: guests.children,
            number_of_guests: guests.number_of_guests,
            card_type: or_default(&request.card_type, DEFAULT_CARD_TYPE),
            card_number: or_default(&request.card_number, DEFAULT_CARD_NUMBER),
            total_price: quote.total_amount,
            ship_id: ship.id,
            ship_name: ship.name.clone(),
            destination: destination.to_string(),
        };
        let cabin = NewCabinRecord {
            passenger_name: full_name.to_string(),
            cruise_name: ship.name.clone(),
            cabin_type: room_type,
            cabin_number: cabin_number.clone(),
            guests_count: guests.number_of_guests,
            booking_date: now.date_naive(),
            total_cost: quote.total_amount,
        };

        let receipt = store.create_booking(booking, cabin).await?;
        info!(
            "Booking {} created: {} {} on {} '{}' ({:?} pricing), total {:.2}",
            receipt.booking_id,
            room_type,
            cabin_number,
            ship.name,
            destination,
            source,
            quote.total_amount
        );

        Ok(BookingConfirmation {
            booking_id: receipt.booking_id,
            cabin_number,
            pricing_details: quote,
            cabin_management: CabinManagementStatus {
                success: true,
                cabin_id: receipt.cabin_id,
            },
        })
    }
}

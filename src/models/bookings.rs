use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{room_type::RoomType, ship::ShipRef};

/// Booking creation payload. Text fields are optional so that missing and
/// blank values are reported together.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingRequest {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub citizenship: Option<String>,
    pub age: Option<u32>,
    pub room_type: Option<String>,
    pub cabin_number: Option<String>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub number_of_guests: Option<u32>,
    pub ship_identifier: Option<ShipRef>,
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
    #[serde(alias = "route")]
    pub destination: Option<String>,
    pub card_type: Option<String>,
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
}

impl BookingRequest {
    /// `ship_identifier` first, then a positive `ship_id`, then `ship_name`.
    pub fn ship_ref(&self) -> Option<ShipRef> {
        self.ship_identifier
            .clone()
            .or_else(|| ShipRef::from_parts(self.ship_id, self.ship_name.as_deref()))
    }
}

/// Validated booking ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub full_name: String,
    pub gender: String,
    pub email: String,
    pub citizenship: String,
    pub age: u32,
    pub room_type: RoomType,
    pub cabin_number: String,
    pub adults: u32,
    pub children: u32,
    pub number_of_guests: u32,
    pub card_type: String,
    pub card_number: String,
    pub total_price: f64,
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub destination: String,
}

/// Stored row of `booking_overview`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingRecord {
    pub booking_id: i64,
    pub full_name: String,
    pub gender: String,
    pub email: String,
    pub citizenship: String,
    pub age: u32,
    pub room_type: RoomType,
    pub cabin_number: String,
    pub adults: u32,
    pub children: u32,
    pub number_of_guests: u32,
    pub card_type: String,
    pub card_number: String,
    pub total_price: f64,
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub destination: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl BookingRecord {
    pub fn new(booking_id: i64, booking: NewBooking, created_at: DateTime<Utc>) -> Self {
        Self {
            booking_id,
            full_name: booking.full_name,
            gender: booking.gender,
            email: booking.email,
            citizenship: booking.citizenship,
            age: booking.age,
            room_type: booking.room_type,
            cabin_number: booking.cabin_number,
            adults: booking.adults,
            children: booking.children,
            number_of_guests: booking.number_of_guests,
            card_type: booking.card_type,
            card_number: booking.card_number,
            total_price: booking.total_price,
            ship_id: booking.ship_id,
            ship_name: booking.ship_name,
            destination: booking.destination,
            created_at: Some(created_at),
        }
    }
}

/// Cabin-management entry written alongside every booking.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCabinRecord {
    pub passenger_name: String,
    pub cruise_name: String,
    pub cabin_type: RoomType,
    pub cabin_number: String,
    pub guests_count: u32,
    pub booking_date: NaiveDate,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CabinRecord {
    pub cabin_id: i64,
    pub booking_id: i64,
    pub passenger_name: String,
    pub cruise_name: String,
    pub cabin_type: RoomType,
    pub cabin_number: String,
    pub guests_count: u32,
    pub booking_date: NaiveDate,
    pub total_cost: f64,
}

impl CabinRecord {
    pub fn new(cabin_id: i64, booking_id: i64, cabin: NewCabinRecord) -> Self {
        Self {
            cabin_id,
            booking_id,
            passenger_name: cabin.passenger_name,
            cruise_name: cabin.cruise_name,
            cabin_type: cabin.cabin_type,
            cabin_number: cabin.cabin_number,
            guests_count: cabin.guests_count,
            booking_date: cabin.booking_date,
            total_cost: cabin.total_cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingReceipt {
    pub booking_id: i64,
    pub cabin_id: i64,
}

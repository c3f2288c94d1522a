use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CruiseError;

/// Traveller details supplied for each passenger on a booking.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PassengerDetails {
    pub passenger_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub citizenship: Option<String>,
}

/// `PassengerDetails` with every field present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPassengerDetails {
    pub passenger_name: String,
    pub email: String,
    pub age: u32,
    pub gender: String,
    pub citizenship: String,
}

fn required_text(value: &Option<String>, field: &str) -> Result<String, CruiseError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CruiseError::Validation(format!("Missing field: {}", field)))
}

impl PassengerDetails {
    pub fn validate(&self) -> Result<ValidPassengerDetails, CruiseError> {
        let passenger_name = required_text(&self.passenger_name, "passenger_name")?;
        let email = required_text(&self.email, "email")?;
        let age = self
            .age
            .ok_or_else(|| CruiseError::Validation("Missing field: age".to_string()))?;
        Ok(ValidPassengerDetails {
            passenger_name,
            email,
            age,
            gender: required_text(&self.gender, "gender")?,
            citizenship: required_text(&self.citizenship, "citizenship")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePassengerRequest {
    pub booking_id: Option<i64>,
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
    pub route: Option<String>,
    pub cabin_id: Option<i64>,
    #[serde(flatten)]
    pub details: PassengerDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddPassengersRequest {
    pub booking_id: Option<i64>,
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
    pub route: Option<String>,
    pub cabin_id: Option<i64>,
    #[serde(rename = "passengerList", default)]
    pub passenger_list: Vec<PassengerDetails>,
}

/// Optional ownership guard applied when deleting a passenger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipGuard {
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
}

impl ShipGuard {
    pub fn permits(&self, passenger: &PassengerRecord) -> bool {
        match (self.ship_id, self.ship_name.as_deref()) {
            (Some(id), _) if id > 0 => passenger.ship_id == Some(id),
            (_, Some(name)) if !name.is_empty() => passenger.ship_name == name,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPassenger {
    pub booking_id: i64,
    pub passenger_name: String,
    pub email: String,
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub route: String,
    pub cabin_id: i64,
    pub age: u32,
    pub gender: String,
    pub citizenship: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PassengerRecord {
    pub passenger_id: i64,
    pub booking_id: i64,
    pub passenger_name: String,
    pub email: String,
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub route: String,
    pub cabin_id: i64,
    pub age: u32,
    pub gender: String,
    pub citizenship: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl NewPassenger {
    pub fn new(
        booking: &PassengerBooking,
        details: ValidPassengerDetails,
        is_primary: bool,
    ) -> Self {
        Self {
            booking_id: booking.booking_id,
            passenger_name: details.passenger_name,
            email: details.email,
            ship_id: booking.ship_id,
            ship_name: booking.ship_name.clone(),
            route: booking.route.clone(),
            cabin_id: booking.cabin_id,
            age: details.age,
            gender: details.gender,
            citizenship: details.citizenship,
            is_primary,
        }
    }
}

/// Booking-level fields shared by every passenger added in one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerBooking {
    pub booking_id: i64,
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub route: String,
    pub cabin_id: i64,
}

impl PassengerRecord {
    pub fn new(passenger_id: i64, passenger: NewPassenger, created_at: DateTime<Utc>) -> Self {
        Self {
            passenger_id,
            booking_id: passenger.booking_id,
            passenger_name: passenger.passenger_name,
            email: passenger.email,
            ship_id: passenger.ship_id,
            ship_name: passenger.ship_name,
            route: passenger.route,
            cabin_id: passenger.cabin_id,
            age: passenger.age,
            gender: passenger.gender,
            citizenship: passenger.citizenship,
            is_primary: passenger.is_primary,
            created_at,
        }
    }
}

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CruiseError;

/// Facility code to "selected" flag, as sent by the booking form.
pub type FacilitySelection = BTreeMap<String, bool>;

/// Facility code to requested quantity. A missing entry means one.
pub type FacilityQuantities = BTreeMap<String, u32>;

/// Row of the `facilities` price list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Facility {
    pub facility_id: i64,
    pub facility: String,
    pub unit_price: f64,
    pub status: String,
}

impl Facility {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }

    pub fn code(&self) -> String {
        facility_code(&self.facility)
    }
}

/// Key derived from a facility name: "Spa & Wellness" becomes
/// "spa_and_wellness".
pub fn facility_code(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .replace('&', "and")
        .replace('\'', "")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityPaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl FacilityPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityPaymentStatus::Pending => "pending",
            FacilityPaymentStatus::Paid => "paid",
            FacilityPaymentStatus::Cancelled => "cancelled",
        }
    }
}

/// Card shown on a paid facility session. Only the last four digits are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedCard {
    pub card_num: String,
    pub card_type: String,
}

/// One facility booking session for a cruise booking. A booking can hold
/// several sessions, each paid, pending or cancelled on its own.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FacilityPreference {
    pub id: i64,
    pub booking_id: i64,
    pub passenger_name: String,
    pub selected_facilities: FacilitySelection,
    pub quantities: FacilityQuantities,
    pub total_cost: f64,
    pub payment_status: FacilityPaymentStatus,
    pub card_num: Option<String>,
    pub card_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FacilityPreference {
    pub fn new(id: i64, preference: NewFacilityPreference, now: DateTime<Utc>) -> Self {
        let (card_num, card_type) = match preference.card {
            Some(card) => (Some(card.card_num), Some(card.card_type)),
            None => (None, None),
        };
        Self {
            id,
            booking_id: preference.booking_id,
            passenger_name: preference.passenger_name,
            selected_facilities: preference.selected_facilities,
            quantities: preference.quantities,
            total_cost: preference.total_cost,
            payment_status: preference.payment_status,
            card_num,
            card_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn selected_codes(&self) -> impl Iterator<Item = &str> {
        self.selected_facilities
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(code, _)| code.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFacilityPreference {
    pub booking_id: i64,
    pub passenger_name: String,
    pub selected_facilities: FacilitySelection,
    pub quantities: FacilityQuantities,
    pub total_cost: f64,
    pub payment_status: FacilityPaymentStatus,
    pub card: Option<MaskedCard>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardDetails {
    #[serde(rename = "cardNumber", alias = "card_number")]
    pub card_number: Option<String>,
    #[serde(rename = "cardType", alias = "card_type")]
    pub card_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityAction {
    Confirm,
    SavePending,
    Cancel,
}

impl FromStr for FacilityAction {
    type Err = CruiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "confirm" => Ok(FacilityAction::Confirm),
            "save_pending" => Ok(FacilityAction::SavePending),
            "cancel" => Ok(FacilityAction::Cancel),
            _ => Err(CruiseError::Validation("Invalid action".to_string())),
        }
    }
}

/// Body of `POST /api/facilities/bookings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacilityBookingRequest {
    pub booking_id: Option<i64>,
    pub action: Option<String>,
    #[serde(default)]
    pub selected_facilities: FacilitySelection,
    #[serde(default)]
    pub quantities: FacilityQuantities,
    pub passenger_name: Option<String>,
    pub passenger_email: Option<String>,
    pub card_details: Option<CardDetails>,
}

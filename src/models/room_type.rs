use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CruiseError;

/// Cabin category. Each one owns a pricing column, a cabin-number prefix and a
/// share of the ship's passenger capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RoomType {
    #[serde(rename = "Interior")]
    Interior,
    #[serde(rename = "Ocean View")]
    OceanView,
    #[serde(rename = "Balcony")]
    Balcony,
    #[serde(rename = "Suite")]
    Suite,
}

/// Prefix used for cabin numbers whose room type is not recognised.
pub const FALLBACK_CABIN_PREFIX: char = 'G';

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::Interior,
        RoomType::OceanView,
        RoomType::Balcony,
        RoomType::Suite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RoomType::Interior => "Interior",
            RoomType::OceanView => "Ocean View",
            RoomType::Balcony => "Balcony",
            RoomType::Suite => "Suite",
        }
    }

    /// Snake-case key used in bulk pricing responses.
    pub fn key(self) -> &'static str {
        match self {
            RoomType::Interior => "interior",
            RoomType::OceanView => "ocean_view",
            RoomType::Balcony => "balcony",
            RoomType::Suite => "suite",
        }
    }

    pub fn price_column(self) -> &'static str {
        match self {
            RoomType::Interior => "interior_price",
            RoomType::OceanView => "ocean_view_price",
            RoomType::Balcony => "balcony_price",
            RoomType::Suite => "suite_price",
        }
    }

    pub fn cabin_prefix(self) -> char {
        match self {
            RoomType::Interior => 'I',
            RoomType::OceanView => 'O',
            RoomType::Balcony => 'B',
            RoomType::Suite => 'S',
        }
    }

    /// Fraction of total passenger capacity allocated to this cabin category.
    pub fn capacity_share(self) -> f64 {
        match self {
            RoomType::Interior => 0.40,
            RoomType::OceanView => 0.30,
            RoomType::Balcony => 0.25,
            RoomType::Suite => 0.05,
        }
    }

    pub fn valid_labels() -> String {
        RoomType::ALL
            .iter()
            .map(|room_type| room_type.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Cabin-number prefix for a raw label, `G` when the label is unknown.
    pub fn prefix_for_label(label: &str) -> char {
        label
            .parse::<RoomType>()
            .map(RoomType::cabin_prefix)
            .unwrap_or(FALLBACK_CABIN_PREFIX)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomType {
    type Err = CruiseError;

    /// Surrounding whitespace is ignored, but matching is case-sensitive.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        RoomType::ALL
            .into_iter()
            .find(|room_type| room_type.label() == trimmed)
            .ok_or_else(|| CruiseError::InvalidRoomType(trimmed.to_string()))
    }
}

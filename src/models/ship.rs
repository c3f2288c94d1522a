use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Ship {
    pub ship_id: i64,
    pub ship_name: String,
    pub passenger_count: u32,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub ship_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Itinerary {
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub route: String,
    pub duration_days: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// How a caller refers to a ship: by numeric identifier or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipRef {
    Id(i64),
    Name(String),
}

impl ShipRef {
    /// Numeric strings are identifiers, anything else non-blank is a name.
    pub fn parse(raw: &str) -> Option<ShipRef> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(id) => Some(ShipRef::Id(id)),
            Err(_) => Some(ShipRef::Name(trimmed.to_string())),
        }
    }

    /// Builds a reference from separate id/name parameters. A positive id wins.
    pub fn from_parts(ship_id: Option<i64>, ship_name: Option<&str>) -> Option<ShipRef> {
        match ship_id {
            Some(id) if id > 0 => Some(ShipRef::Id(id)),
            _ => ship_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| ShipRef::Name(name.to_string())),
        }
    }
}

impl std::fmt::Display for ShipRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShipRef::Id(id) => write!(f, "id {}", id),
            ShipRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawShipRef {
    Id(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for ShipRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawShipRef::deserialize(deserializer)? {
            RawShipRef::Id(id) => Ok(ShipRef::Id(id)),
            RawShipRef::Name(name) => ShipRef::parse(&name)
                .ok_or_else(|| de::Error::custom("ship reference must not be empty")),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::models::room_type::RoomType;

/// One row of `cabin_type_pricing`: per-person trip prices for a ship/route.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CabinTypePricing {
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub route: String,
    pub interior_price: Option<f64>,
    pub ocean_view_price: Option<f64>,
    pub balcony_price: Option<f64>,
    pub suite_price: Option<f64>,
}

impl CabinTypePricing {
    pub fn price_for(&self, room_type: RoomType) -> Option<f64> {
        match room_type {
            RoomType::Interior => self.interior_price,
            RoomType::OceanView => self.ocean_view_price,
            RoomType::Balcony => self.balcony_price,
            RoomType::Suite => self.suite_price,
        }
    }

    /// All four prices with missing columns read as zero.
    pub fn prices(&self) -> RoomPrices {
        RoomPrices {
            interior: self.interior_price.unwrap_or(0.0),
            ocean_view: self.ocean_view_price.unwrap_or(0.0),
            balcony: self.balcony_price.unwrap_or(0.0),
            suite: self.suite_price.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoomPrices {
    pub interior: f64,
    pub ocean_view: f64,
    pub balcony: f64,
    pub suite: f64,
}

impl RoomPrices {
    pub fn get(&self, room_type: RoomType) -> f64 {
        match room_type {
            RoomType::Interior => self.interior,
            RoomType::OceanView => self.ocean_view,
            RoomType::Balcony => self.balcony,
            RoomType::Suite => self.suite,
        }
    }
}

/// Pricing row joined with its ship and itinerary, as listed by the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingListing {
    pub ship_id: i64,
    pub ship_name: String,
    pub route: String,
    pub interior_price: Option<f64>,
    pub ocean_view_price: Option<f64>,
    pub balcony_price: Option<f64>,
    pub suite_price: Option<f64>,
    pub ship_class: Option<String>,
    pub year_built: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PricingFilter {
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
    pub route: Option<String>,
    pub min_price: f64,
    pub max_price: f64,
}

impl PricingFilter {
    /// A positive minimum keeps rows where any price reaches it; a positive
    /// maximum keeps rows where every price stays under it.
    pub fn matches_prices(&self, pricing: &CabinTypePricing) -> bool {
        let prices = pricing.prices();
        if self.min_price > 0.0
            && !RoomType::ALL
                .iter()
                .any(|room_type| prices.get(*room_type) >= self.min_price)
        {
            return false;
        }
        if self.max_price > 0.0
            && !RoomType::ALL
                .iter()
                .all(|room_type| prices.get(*room_type) <= self.max_price)
        {
            return false;
        }
        true
    }
}

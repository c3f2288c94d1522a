use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    db::store::{CruiseStore, ShipKey},
    error::CruiseError,
    models::{
        pricing::{CabinTypePricing, RoomPrices},
        room_type::RoomType,
        ship::ShipRef,
    },
    services::ship_resolver::{ResolvedShip, ShipResolver},
};

/// Trip length used when the itinerary does not record one.
pub const DEFAULT_TRIP_DURATION_DAYS: u32 = 7;

/// Children travel at this fraction of the adult price.
pub const CHILD_PRICE_FACTOR: f64 = 0.5;

/// Which key found the pricing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingSource {
    ShipId,
    ShipName,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitPrice {
    pub price: f64,
    pub source: PricingSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingMatch {
    pub pricing: CabinTypePricing,
    pub source: PricingSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestBreakdown {
    pub adults: u32,
    pub children: u32,
    pub number_of_guests: u32,
}

impl GuestBreakdown {
    /// A zero guest count is read as one guest.
    pub fn new(adults: u32, children: u32, number_of_guests: u32) -> Self {
        Self {
            adults,
            children,
            number_of_guests: number_of_guests.max(1),
        }
    }

    /// The adult/child split only counts when it adds up to the guest total.
    pub fn is_authoritative(&self) -> bool {
        match self.adults.checked_add(self.children) {
            Some(declared) => declared == self.number_of_guests && declared > 0,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub base_price_per_person: f64,
    pub number_of_guests: u32,
    pub trip_duration_days: u32,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddPricingRequest {
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
    pub route: Option<String>,
    pub interior_price: Option<f64>,
    pub ocean_view_price: Option<f64>,
    pub balcony_price: Option<f64>,
    pub suite_price: Option<f64>,
}

pub struct PricingService;

impl PricingService {
    /// Total for one trip. Prices are per person for the whole trip, so the
    /// duration never enters the total.
    pub fn calculate_total(base_price: f64, guests: &GuestBreakdown) -> f64 {
        if guests.is_authoritative() {
            guests.adults as f64 * base_price
                + guests.children as f64 * base_price * CHILD_PRICE_FACTOR
        } else {
            debug!(
                "Guest breakdown {}+{} does not match {} guests, pricing everyone as adults",
                guests.adults, guests.children, guests.number_of_guests
            );
            guests.number_of_guests as f64 * base_price
        }
    }

    /// Finds the pricing row for a ship and route: by id first, then by name.
    pub async fn find_pricing(
        store: &dyn CruiseStore,
        ship: &ResolvedShip,
        route: &str,
    ) -> Result<PricingMatch, CruiseError> {
        if let Some(ship_id) = ship.id {
            if let Some(pricing) = store.find_pricing(ShipKey::Id(ship_id), route).await? {
                return Ok(PricingMatch {
                    pricing,
                    source: PricingSource::ShipId,
                });
            }
        }

        match store.find_pricing(ShipKey::Name(&ship.name), route).await? {
            Some(pricing) => Ok(PricingMatch {
                pricing,
                source: PricingSource::ShipName,
            }),
            None => Err(CruiseError::PricingNotFound),
        }
    }

    /// Unit price for one room type. An id-keyed row only counts when its
    /// column for this room type holds a price.
    pub async fn unit_price(
        store: &dyn CruiseStore,
        ship: &ResolvedShip,
        route: &str,
        room_type: RoomType,
    ) -> Result<UnitPrice, CruiseError> {
        if let Some(ship_id) = ship.id {
            let row = store.find_pricing(ShipKey::Id(ship_id), route).await?;
            if let Some(price) = row.and_then(|r| r.price_for(room_type)) {
                return Ok(UnitPrice {
                    price,
                    source: PricingSource::ShipId,
                });
            }
            debug!(
                "No {} price keyed by ship id {} on '{}', trying ship name",
                room_type, ship_id, route
            );
        }

        let row = store.find_pricing(ShipKey::Name(&ship.name), route).await?;
        match row.and_then(|r| r.price_for(room_type)) {
            Some(price) => Ok(UnitPrice {
                price,
                source: PricingSource::ShipName,
            }),
            None => Err(CruiseError::PricingNotFound),
        }
    }

    /// All four prices for a ship and route; absent columns read as zero.
    pub async fn all_prices(
        store: &dyn CruiseStore,
        ship: &ResolvedShip,
        route: &str,
    ) -> Result<(RoomPrices, PricingSource), CruiseError> {
        let found = Self::find_pricing(store, ship, route).await?;
        Ok((found.pricing.prices(), found.source))
    }

    /// Itinerary length in days, falling back to a week.
    pub async fn trip_duration(store: &dyn CruiseStore, ship_name: &str, route: &str) -> u32 {
        match store.find_itinerary_duration(ship_name, route).await {
            Ok(Some(days)) => days,
            Ok(None) => DEFAULT_TRIP_DURATION_DAYS,
            Err(err) => {
                warn!(
                    "Trip duration lookup for {} on '{}' failed, using default: {}",
                    ship_name, route, err
                );
                DEFAULT_TRIP_DURATION_DAYS
            }
        }
    }

    pub async fn quote(
        store: &dyn CruiseStore,
        ship: &ResolvedShip,
        route: &str,
        room_type: RoomType,
        guests: &GuestBreakdown,
    ) -> Result<(PriceQuote, PricingSource), CruiseError> {
        let unit = Self::unit_price(store, ship, route, room_type).await?;
        let trip_duration_days = Self::trip_duration(store, &ship.name, route).await;
        let quote = PriceQuote {
            base_price_per_person: unit.price,
            number_of_guests: guests.number_of_guests,
            trip_duration_days,
            total_amount: Self::calculate_total(unit.price, guests),
        };
        Ok((quote, unit.source))
    }

    /// Adds a pricing row for a known ship sailing a known route. Returns the
    /// ship id the row was stored under.
    pub async fn add_pricing(
        store: &dyn CruiseStore,
        request: AddPricingRequest,
    ) -> Result<i64, CruiseError> {
        let reference = ShipRef::from_parts(request.ship_id, request.ship_name.as_deref())
            .ok_or_else(|| CruiseError::Validation("Ship ID or ship name is required.".into()))?;
        let route = request
            .route
            .as_deref()
            .map(str::trim)
            .filter(|route| !route.is_empty())
            .ok_or_else(|| CruiseError::Validation("Route is required.".into()))?
            .to_string();

        let ship = match ShipResolver::find_record(store, &reference).await {
            Ok(ship) => ship,
            Err(CruiseError::ShipNotFound(_)) => {
                let message = match reference {
                    ShipRef::Id(_) => "Invalid ship ID.",
                    ShipRef::Name(_) => "Invalid ship name.",
                };
                return Err(CruiseError::Validation(message.into()));
            }
            Err(err) => return Err(err),
        };

        if !store.itinerary_exists(ship.ship_id, &route).await? {
            return Err(CruiseError::Validation(
                "Invalid ship or route combination.".into(),
            ));
        }

        let pricing = CabinTypePricing {
            ship_id: Some(ship.ship_id),
            ship_name: ship.ship_name,
            route,
            interior_price: Some(request.interior_price.unwrap_or(0.0)),
            ocean_view_price: Some(request.ocean_view_price.unwrap_or(0.0)),
            balcony_price: Some(request.balcony_price.unwrap_or(0.0)),
            suite_price: Some(request.suite_price.unwrap_or(0.0)),
        };
        store.insert_pricing(&pricing).await?;
        Ok(ship.ship_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::ship::{Itinerary, Ship},
        services::ship_resolver::ShipResolution,
    };

    fn pricing(ship_id: Option<i64>, name: &str, interior: Option<f64>) -> CabinTypePricing {
        CabinTypePricing {
            ship_id,
            ship_name: name.to_string(),
            route: "Caribbean".to_string(),
            interior_price: interior,
            ocean_view_price: Some(150.0),
            balcony_price: Some(220.0),
            suite_price: None,
        }
    }

    fn resolved(id: Option<i64>, name: &str) -> ResolvedShip {
        ResolvedShip {
            id,
            name: name.to_string(),
            passenger_count: None,
            resolution: if id.is_some() {
                ShipResolution::ById
            } else {
                ShipResolution::NameOnly
            },
        }
    }

    #[test]
    fn test_breakdown_prices_children_at_half() {
        let guests = GuestBreakdown::new(2, 1, 3);
        assert_eq!(PricingService::calculate_total(100.0, &guests), 250.0);
    }

    #[test]
    fn test_mismatched_breakdown_prices_everyone_as_adults() {
        let guests = GuestBreakdown::new(0, 0, 4);
        assert_eq!(PricingService::calculate_total(100.0, &guests), 400.0);

        let overdeclared = GuestBreakdown::new(3, 2, 4);
        assert_eq!(PricingService::calculate_total(80.0, &overdeclared), 320.0);
    }

    #[test]
    fn test_breakdown_formula_holds_across_splits() {
        let price = 137.5;
        for adults in 0..6u32 {
            for children in 0..6u32 {
                let guests = adults + children;
                if guests == 0 {
                    continue;
                }
                let breakdown = GuestBreakdown::new(adults, children, guests);
                let expected = adults as f64 * price + children as f64 * price * 0.5;
                assert_eq!(PricingService::calculate_total(price, &breakdown), expected);
            }
        }
    }

    #[test]
    fn test_overflowing_breakdown_uses_flat_price() {
        let guests = GuestBreakdown::new(u32::MAX, 1, 3);
        assert!(!guests.is_authoritative());
        assert_eq!(PricingService::calculate_total(100.0, &guests), 300.0);
    }

    #[test]
    fn test_zero_guests_counts_as_one() {
        let guests = GuestBreakdown::new(0, 0, 0);
        assert_eq!(guests.number_of_guests, 1);
        assert_eq!(PricingService::calculate_total(99.0, &guests), 99.0);
    }

    #[actix_web::test]
    async fn test_identifier_row_wins_over_name_row() {
        let store = MemoryStore::new();
        store.add_pricing(pricing(None, "Aurora", Some(90.0)));
        store.add_pricing(pricing(Some(1), "Aurora", Some(120.0)));

        let unit = PricingService::unit_price(
            &store,
            &resolved(Some(1), "Aurora"),
            "Caribbean",
            RoomType::Interior,
        )
        .await
        .unwrap();
        assert_eq!(unit.price, 120.0);
        assert_eq!(unit.source, PricingSource::ShipId);
    }

    #[actix_web::test]
    async fn test_null_identifier_column_falls_back_to_name() {
        let store = MemoryStore::new();
        store.add_pricing(pricing(Some(1), "Aurora Legacy", None));
        store.add_pricing(pricing(None, "Aurora", Some(95.0)));

        let unit = PricingService::unit_price(
            &store,
            &resolved(Some(1), "Aurora"),
            "Caribbean",
            RoomType::Interior,
        )
        .await
        .unwrap();
        assert_eq!(unit.price, 95.0);
        assert_eq!(unit.source, PricingSource::ShipName);
    }

    #[actix_web::test]
    async fn test_missing_row_is_pricing_not_found() {
        let store = MemoryStore::new();
        store.add_pricing(pricing(Some(1), "Aurora", Some(100.0)));

        let result = PricingService::unit_price(
            &store,
            &resolved(None, "Nonexistent"),
            "Caribbean",
            RoomType::Interior,
        )
        .await;
        assert!(matches!(result, Err(CruiseError::PricingNotFound)));

        let other_route = PricingService::all_prices(
            &store,
            &resolved(Some(1), "Aurora"),
            "Alaska",
        )
        .await;
        assert!(matches!(other_route, Err(CruiseError::PricingNotFound)));
    }

    #[actix_web::test]
    async fn test_bulk_prices_read_missing_columns_as_zero() {
        let store = MemoryStore::new();
        store.add_pricing(pricing(Some(1), "Aurora", Some(100.0)));

        let (prices, source) =
            PricingService::all_prices(&store, &resolved(Some(1), "Aurora"), "Caribbean")
                .await
                .unwrap();
        assert_eq!(source, PricingSource::ShipId);
        assert_eq!(prices.interior, 100.0);
        assert_eq!(prices.suite, 0.0);
    }

    #[actix_web::test]
    async fn test_duration_defaults_to_a_week() {
        let store = MemoryStore::new();
        store.add_itinerary(Itinerary {
            ship_id: Some(1),
            ship_name: "Aurora".to_string(),
            route: "Caribbean".to_string(),
            duration_days: Some(10),
            start_date: None,
            end_date: None,
        });

        assert_eq!(
            PricingService::trip_duration(&store, "Aurora", "Caribbean").await,
            10
        );
        assert_eq!(
            PricingService::trip_duration(&store, "Aurora", "Alaska").await,
            DEFAULT_TRIP_DURATION_DAYS
        );
    }

    #[actix_web::test]
    async fn test_quote_does_not_scale_with_duration() {
        let store = MemoryStore::new();
        store.add_pricing(pricing(Some(1), "Aurora", Some(100.0)));
        store.add_itinerary(Itinerary {
            ship_id: Some(1),
            ship_name: "Aurora".to_string(),
            route: "Caribbean".to_string(),
            duration_days: Some(14),
            start_date: None,
            end_date: None,
        });

        let (quote, _) = PricingService::quote(
            &store,
            &resolved(Some(1), "Aurora"),
            "Caribbean",
            RoomType::Interior,
            &GuestBreakdown::new(2, 0, 2),
        )
        .await
        .unwrap();
        assert_eq!(quote.trip_duration_days, 14);
        assert_eq!(quote.total_amount, 200.0);
    }

    #[actix_web::test]
    async fn test_add_pricing_requires_known_itinerary() {
        let store = MemoryStore::new();
        store.add_ship(Ship {
            ship_id: 1,
            ship_name: "Aurora".to_string(),
            passenger_count: 800,
            ship_class: None,
            year_built: None,
        });
        store.add_itinerary(Itinerary {
            ship_id: Some(1),
            ship_name: "Aurora".to_string(),
            route: "Caribbean".to_string(),
            duration_days: None,
            start_date: None,
            end_date: None,
        });

        let request = |route: &str| AddPricingRequest {
            ship_id: None,
            ship_name: Some("Aurora".to_string()),
            route: Some(route.to_string()),
            interior_price: Some(100.0),
            ocean_view_price: None,
            balcony_price: None,
            suite_price: None,
        };

        let rejected = PricingService::add_pricing(&store, request("Alaska")).await;
        match rejected {
            Err(CruiseError::Validation(message)) => {
                assert_eq!(message, "Invalid ship or route combination.")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let ship_id = PricingService::add_pricing(&store, request("Caribbean"))
            .await
            .unwrap();
        assert_eq!(ship_id, 1);
        let rows = store.pricing_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ship_id, Some(1));
        assert_eq!(rows[0].ocean_view_price, Some(0.0));
    }

    #[actix_web::test]
    async fn test_add_pricing_rejects_unknown_ship_id() {
        let store = MemoryStore::new();
        let request = AddPricingRequest {
            ship_id: Some(9),
            ship_name: None,
            route: Some("Caribbean".to_string()),
            interior_price: None,
            ocean_view_price: None,
            balcony_price: None,
            suite_price: None,
        };
        match PricingService::add_pricing(&store, request).await {
            Err(CruiseError::Validation(message)) => assert_eq!(message, "Invalid ship ID."),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

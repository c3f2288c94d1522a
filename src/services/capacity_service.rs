//! Cabin inventory estimate.
//!
//! Ships do not record their cabin counts, so capacity is derived from the
//! passenger count: each room type gets a fixed share of passengers
//! (see `RoomType::capacity_share`), at four passengers per cabin.
//!
//! Bookings are only counted, never reserved. Two concurrent bookings can
//! both see the same free cabin, so a route can end up over-booked; the
//! `available` figure clamps at zero when that happens.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    db::store::CruiseStore, error::CruiseError, models::room_type::RoomType,
    services::ship_resolver::ResolvedShip,
};

pub const PASSENGERS_PER_CABIN: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CabinAvailability {
    pub cabin_type: RoomType,
    pub total_capacity: u32,
    pub booked: u32,
    pub available: u32,
    pub availability_percentage: f64,
}

pub struct CapacityEstimator;

impl CapacityEstimator {
    pub fn total_capacity(passenger_count: u32, room_type: RoomType) -> u32 {
        (passenger_count as f64 * room_type.capacity_share() / PASSENGERS_PER_CABIN).floor()
            as u32
    }

    fn percentage(available: u32, total_capacity: u32) -> f64 {
        if total_capacity == 0 {
            return 0.0;
        }
        let raw = available as f64 / total_capacity as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    }

    /// Per-room-type availability for a ship of `passenger_count` given the
    /// booking counts already on the route.
    pub fn summarize(
        passenger_count: u32,
        booked: &HashMap<RoomType, u32>,
    ) -> Vec<CabinAvailability> {
        RoomType::ALL
            .iter()
            .map(|room_type| {
                let total_capacity = Self::total_capacity(passenger_count, *room_type);
                let booked = booked.get(room_type).copied().unwrap_or(0);
                let available = total_capacity.saturating_sub(booked);
                CabinAvailability {
                    cabin_type: *room_type,
                    total_capacity,
                    booked,
                    available,
                    availability_percentage: Self::percentage(available, total_capacity),
                }
            })
            .collect()
    }

    pub async fn estimate(
        store: &dyn CruiseStore,
        ship: &ResolvedShip,
        route: &str,
        passenger_count: u32,
    ) -> Result<Vec<CabinAvailability>, CruiseError> {
        let booked = store
            .count_bookings_by_room_type(ship.id, &ship.name, route)
            .await?;
        Ok(Self::summarize(passenger_count, &booked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::bookings::NewBooking,
        services::ship_resolver::ShipResolution,
    };

    fn capacity_for(summary: &[CabinAvailability], room_type: RoomType) -> &CabinAvailability {
        summary
            .iter()
            .find(|entry| entry.cabin_type == room_type)
            .unwrap()
    }

    #[test]
    fn test_splits_passengers_by_share_and_cabin_size() {
        let summary = CapacityEstimator::summarize(1000, &HashMap::new());
        assert_eq!(capacity_for(&summary, RoomType::Interior).total_capacity, 100);
        assert_eq!(capacity_for(&summary, RoomType::OceanView).total_capacity, 75);
        assert_eq!(capacity_for(&summary, RoomType::Balcony).total_capacity, 62);
        assert_eq!(capacity_for(&summary, RoomType::Suite).total_capacity, 12);
        assert!(summary
            .iter()
            .all(|entry| entry.availability_percentage == 100.0));
    }

    #[test]
    fn test_overbooking_clamps_available_at_zero() {
        let booked = HashMap::from([(RoomType::Suite, 40)]);
        let summary = CapacityEstimator::summarize(1000, &booked);
        let suite = capacity_for(&summary, RoomType::Suite);
        assert_eq!(suite.booked, 40);
        assert_eq!(suite.available, 0);
        assert_eq!(suite.availability_percentage, 0.0);
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        let booked = HashMap::from([(RoomType::OceanView, 1)]);
        let summary = CapacityEstimator::summarize(1000, &booked);
        // 74 of 75 cabins free
        assert_eq!(
            capacity_for(&summary, RoomType::OceanView).availability_percentage,
            98.7
        );
    }

    #[test]
    fn test_tiny_ship_reports_zero_percent_for_empty_categories() {
        let summary = CapacityEstimator::summarize(20, &HashMap::new());
        let suite = capacity_for(&summary, RoomType::Suite);
        assert_eq!(suite.total_capacity, 0);
        assert_eq!(suite.available, 0);
        assert_eq!(suite.availability_percentage, 0.0);
        assert_eq!(capacity_for(&summary, RoomType::Interior).total_capacity, 2);
    }

    fn booking(ship_id: Option<i64>, ship_name: &str, room_type: RoomType, route: &str) -> NewBooking {
        NewBooking {
            full_name: "Guest".to_string(),
            gender: "Male".to_string(),
            email: "guest@example.com".to_string(),
            citizenship: String::new(),
            age: 30,
            room_type,
            cabin_number: "I001".to_string(),
            adults: 1,
            children: 0,
            number_of_guests: 1,
            card_type: "Visa".to_string(),
            card_number: "0000000000000000".to_string(),
            total_price: 100.0,
            ship_id,
            ship_name: ship_name.to_string(),
            destination: route.to_string(),
        }
    }

    #[test]
    fn test_counts_bookings_matched_by_id_or_name_on_the_route() {
        let store = MemoryStore::new();
        store.add_booking(booking(Some(5), "Aurora", RoomType::Interior, "Caribbean"));
        store.add_booking(booking(None, "Aurora", RoomType::Interior, "Caribbean"));
        store.add_booking(booking(Some(5), "Renamed", RoomType::Balcony, "Caribbean"));
        store.add_booking(booking(Some(5), "Aurora", RoomType::Interior, "Alaska"));
        store.add_booking(booking(Some(6), "Borealis", RoomType::Interior, "Caribbean"));

        let ship = ResolvedShip {
            id: Some(5),
            name: "Aurora".to_string(),
            passenger_count: Some(1000),
            resolution: ShipResolution::ById,
        };
        let summary = tokio_test::block_on(CapacityEstimator::estimate(
            &store,
            &ship,
            "Caribbean",
            1000,
        ))
        .unwrap();

        let interior = capacity_for(&summary, RoomType::Interior);
        assert_eq!(interior.booked, 2);
        assert_eq!(interior.available, 98);
        assert_eq!(interior.availability_percentage, 98.0);
        assert_eq!(capacity_for(&summary, RoomType::Balcony).booked, 1);
    }
}

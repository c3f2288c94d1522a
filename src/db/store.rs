use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    error::CruiseError,
    models::{
        bookings::{BookingReceipt, BookingRecord, NewBooking, NewCabinRecord},
        facility::{Facility, FacilityPreference, MaskedCard, NewFacilityPreference},
        passenger::{NewPassenger, PassengerRecord},
        pricing::{CabinTypePricing, PricingFilter, PricingListing},
        room_type::RoomType,
        ship::{Itinerary, Ship},
        user::{ProfileUpdate, UserProfile},
    },
};

/// Key used to select a pricing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipKey<'a> {
    Id(i64),
    Name(&'a str),
}

/// Data access used by the services. Every call is an independent read or
/// write; `create_booking` is the only multi-statement operation and must be
/// atomic.
#[async_trait]
pub trait CruiseStore: Send + Sync {
    async fn ping(&self) -> Result<(), CruiseError>;

    async fn find_ship_by_id(&self, ship_id: i64) -> Result<Option<Ship>, CruiseError>;

    async fn find_ship_by_name(&self, ship_name: &str) -> Result<Option<Ship>, CruiseError>;

    async fn find_pricing(
        &self,
        key: ShipKey<'_>,
        route: &str,
    ) -> Result<Option<CabinTypePricing>, CruiseError>;

    async fn search_pricing(
        &self,
        filter: &PricingFilter,
    ) -> Result<Vec<PricingListing>, CruiseError>;

    async fn insert_pricing(&self, pricing: &CabinTypePricing) -> Result<(), CruiseError>;

    async fn itinerary_exists(&self, ship_id: i64, route: &str) -> Result<bool, CruiseError>;

    async fn find_itinerary(
        &self,
        ship_name: &str,
        route: &str,
    ) -> Result<Option<Itinerary>, CruiseError>;

    async fn find_itinerary_duration(
        &self,
        ship_name: &str,
        route: &str,
    ) -> Result<Option<u32>, CruiseError>;

    /// Bookings on the route whose ship id or ship name matches, per room type.
    async fn count_bookings_by_room_type(
        &self,
        ship_id: Option<i64>,
        ship_name: &str,
        route: &str,
    ) -> Result<HashMap<RoomType, u32>, CruiseError>;

    async fn cabin_number_taken(
        &self,
        ship_name: &str,
        cabin_number: &str,
    ) -> Result<bool, CruiseError>;

    /// Writes the booking and its cabin-management record together. When the
    /// cabin record fails after the booking was written, nothing is kept and
    /// `PartialBookingFailure` is returned.
    async fn create_booking(
        &self,
        booking: NewBooking,
        cabin: NewCabinRecord,
    ) -> Result<BookingReceipt, CruiseError>;

    async fn find_booking(&self, booking_id: i64) -> Result<Option<BookingRecord>, CruiseError>;

    /// Facilities whose status is `active`.
    async fn active_facilities(&self) -> Result<Vec<Facility>, CruiseError>;

    /// Facility sessions of one booking, oldest first.
    async fn find_facility_preferences(
        &self,
        booking_id: i64,
    ) -> Result<Vec<FacilityPreference>, CruiseError>;

    async fn insert_facility_preference(
        &self,
        preference: NewFacilityPreference,
    ) -> Result<i64, CruiseError>;

    /// Marks the booking's pending facility sessions paid. Returns how many
    /// sessions changed.
    async fn settle_pending_facilities(
        &self,
        booking_id: i64,
        card: Option<&MaskedCard>,
    ) -> Result<u64, CruiseError>;

    /// Marks every facility session of the booking cancelled.
    async fn cancel_facilities(&self, booking_id: i64) -> Result<u64, CruiseError>;

    async fn insert_passengers(
        &self,
        passengers: Vec<NewPassenger>,
    ) -> Result<Vec<i64>, CruiseError>;

    async fn find_passenger(
        &self,
        passenger_id: i64,
    ) -> Result<Option<PassengerRecord>, CruiseError>;

    async fn delete_passenger(&self, passenger_id: i64) -> Result<bool, CruiseError>;

    async fn find_user(&self, user_id: i64) -> Result<Option<UserProfile>, CruiseError>;

    async fn update_user_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<bool, CruiseError>;
}

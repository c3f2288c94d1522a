use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    db::store::{CruiseStore, ShipKey},
    error::CruiseError,
    models::{
        bookings::{BookingReceipt, BookingRecord, CabinRecord, NewBooking, NewCabinRecord},
        facility::{
            Facility, FacilityPaymentStatus, FacilityPreference, MaskedCard,
            NewFacilityPreference,
        },
        passenger::{NewPassenger, PassengerRecord},
        pricing::{CabinTypePricing, PricingFilter, PricingListing},
        room_type::RoomType,
        ship::{Itinerary, Ship},
        user::{ProfileUpdate, UserProfile},
    },
};

#[derive(Default)]
struct MemoryState {
    ships: Vec<Ship>,
    itineraries: Vec<Itinerary>,
    pricing: Vec<CabinTypePricing>,
    bookings: Vec<BookingRecord>,
    cabins: Vec<CabinRecord>,
    passengers: Vec<PassengerRecord>,
    users: Vec<UserProfile>,
    facilities: Vec<Facility>,
    facility_preferences: Vec<FacilityPreference>,
    sequences: HashMap<&'static str, i64>,
}

impl MemoryState {
    fn next_id(&mut self, sequence: &'static str) -> i64 {
        let seq = self.sequences.entry(sequence).or_insert(0);
        *seq += 1;
        *seq
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-process `CruiseStore` with the same matching rules as `MongoStore`.
/// Used by the test suites.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_cabin_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_ship(&self, ship: Ship) {
        self.state().ships.push(ship);
    }

    pub fn add_itinerary(&self, itinerary: Itinerary) {
        self.state().itineraries.push(itinerary);
    }

    pub fn add_pricing(&self, pricing: CabinTypePricing) {
        self.state().pricing.push(pricing);
    }

    pub fn add_user(&self, user: UserProfile) {
        self.state().users.push(user);
    }

    /// Seeds an existing booking, e.g. to fill up a ship's capacity.
    pub fn add_booking(&self, booking: NewBooking) -> i64 {
        let mut state = self.state();
        let booking_id = state.next_id("booking_overview");
        state
            .bookings
            .push(BookingRecord::new(booking_id, booking, Utc::now()));
        booking_id
    }

    pub fn add_cabin(&self, booking_id: i64, cabin: NewCabinRecord) -> i64 {
        let mut state = self.state();
        let cabin_id = state.next_id("cabin_management");
        state
            .cabins
            .push(CabinRecord::new(cabin_id, booking_id, cabin));
        cabin_id
    }

    pub fn add_facility(&self, facility: Facility) {
        self.state().facilities.push(facility);
    }

    /// Makes every following cabin-management insert fail.
    pub fn fail_cabin_inserts(&self, fail: bool) {
        self.fail_cabin_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn bookings(&self) -> Vec<BookingRecord> {
        self.state().bookings.clone()
    }

    pub fn cabins(&self) -> Vec<CabinRecord> {
        self.state().cabins.clone()
    }

    pub fn passengers(&self) -> Vec<PassengerRecord> {
        self.state().passengers.clone()
    }

    pub fn pricing_rows(&self) -> Vec<CabinTypePricing> {
        self.state().pricing.clone()
    }

    pub fn facility_sessions(&self) -> Vec<FacilityPreference> {
        self.state().facility_preferences.clone()
    }
}

#[async_trait]
impl CruiseStore for MemoryStore {
    async fn ping(&self) -> Result<(), CruiseError> {
        Ok(())
    }

    async fn find_ship_by_id(&self, ship_id: i64) -> Result<Option<Ship>, CruiseError> {
        Ok(self
            .state()
            .ships
            .iter()
            .find(|ship| ship.ship_id == ship_id)
            .cloned())
    }

    async fn find_ship_by_name(&self, ship_name: &str) -> Result<Option<Ship>, CruiseError> {
        Ok(self
            .state()
            .ships
            .iter()
            .find(|ship| ship.ship_name == ship_name)
            .cloned())
    }

    async fn find_pricing(
        &self,
        key: ShipKey<'_>,
        route: &str,
    ) -> Result<Option<CabinTypePricing>, CruiseError> {
        Ok(self
            .state()
            .pricing
            .iter()
            .find(|row| {
                row.route == route
                    && match key {
                        ShipKey::Id(ship_id) => row.ship_id == Some(ship_id),
                        ShipKey::Name(ship_name) => row.ship_name == ship_name,
                    }
            })
            .cloned())
    }

    async fn search_pricing(
        &self,
        filter: &PricingFilter,
    ) -> Result<Vec<PricingListing>, CruiseError> {
        let state = self.state();
        let mut listings: Vec<PricingListing> = state
            .pricing
            .iter()
            .filter(|row| match filter.ship_id {
                Some(id) if id > 0 => row.ship_id == Some(id),
                _ => true,
            })
            .filter(|row| match filter.route.as_deref() {
                Some(route) if !route.is_empty() => contains_ignore_case(&row.route, route),
                _ => true,
            })
            .filter(|row| filter.matches_prices(row))
            .filter_map(|row| {
                let ship_id = row.ship_id?;
                let ship = state.ships.iter().find(|s| s.ship_id == ship_id)?;
                let name_matches = match (filter.ship_id, filter.ship_name.as_deref()) {
                    (Some(id), _) if id > 0 => true,
                    (_, Some(name)) if !name.is_empty() => {
                        contains_ignore_case(&ship.ship_name, name)
                    }
                    _ => true,
                };
                if !name_matches {
                    return None;
                }
                let itinerary = state
                    .itineraries
                    .iter()
                    .find(|it| it.ship_id == Some(ship_id) && it.route == row.route)?;
                Some(PricingListing {
                    ship_id,
                    ship_name: ship.ship_name.clone(),
                    route: row.route.clone(),
                    interior_price: row.interior_price,
                    ocean_view_price: row.ocean_view_price,
                    balcony_price: row.balcony_price,
                    suite_price: row.suite_price,
                    ship_class: ship.ship_class.clone(),
                    year_built: ship.year_built,
                    start_date: itinerary.start_date.clone(),
                    end_date: itinerary.end_date.clone(),
                })
            })
            .collect();

        listings.sort_by(|a, b| {
            a.ship_name
                .cmp(&b.ship_name)
                .then_with(|| a.route.cmp(&b.route))
        });
        Ok(listings)
    }

    async fn insert_pricing(&self, pricing: &CabinTypePricing) -> Result<(), CruiseError> {
        self.state().pricing.push(pricing.clone());
        Ok(())
    }

    async fn itinerary_exists(&self, ship_id: i64, route: &str) -> Result<bool, CruiseError> {
        Ok(self
            .state()
            .itineraries
            .iter()
            .any(|it| it.ship_id == Some(ship_id) && it.route == route))
    }

    async fn find_itinerary(
        &self,
        ship_name: &str,
        route: &str,
    ) -> Result<Option<Itinerary>, CruiseError> {
        Ok(self
            .state()
            .itineraries
            .iter()
            .find(|it| it.ship_name == ship_name && it.route == route)
            .cloned())
    }

    async fn find_itinerary_duration(
        &self,
        ship_name: &str,
        route: &str,
    ) -> Result<Option<u32>, CruiseError> {
        Ok(self
            .state()
            .itineraries
            .iter()
            .find(|it| it.ship_name == ship_name && it.route == route)
            .and_then(|it| it.duration_days))
    }

    async fn count_bookings_by_room_type(
        &self,
        ship_id: Option<i64>,
        ship_name: &str,
        route: &str,
    ) -> Result<HashMap<RoomType, u32>, CruiseError> {
        let mut counts = HashMap::new();
        for booking in self.state().bookings.iter() {
            let same_ship = (ship_id.is_some() && booking.ship_id == ship_id)
                || booking.ship_name == ship_name;
            if same_ship && booking.destination == route {
                *counts.entry(booking.room_type).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn cabin_number_taken(
        &self,
        ship_name: &str,
        cabin_number: &str,
    ) -> Result<bool, CruiseError> {
        Ok(self
            .state()
            .cabins
            .iter()
            .any(|cabin| cabin.cruise_name == ship_name && cabin.cabin_number == cabin_number))
    }

    async fn create_booking(
        &self,
        booking: NewBooking,
        cabin: NewCabinRecord,
    ) -> Result<BookingReceipt, CruiseError> {
        let mut state = self.state();
        let booking_id = state.next_id("booking_overview");
        state
            .bookings
            .push(BookingRecord::new(booking_id, booking, Utc::now()));

        if self.fail_cabin_inserts.load(Ordering::SeqCst) {
            state.bookings.retain(|b| b.booking_id != booking_id);
            return Err(CruiseError::PartialBookingFailure {
                booking_id,
                reason: "cabin_management insert rejected".to_string(),
            });
        }

        let cabin_id = state.next_id("cabin_management");
        state
            .cabins
            .push(CabinRecord::new(cabin_id, booking_id, cabin));

        Ok(BookingReceipt {
            booking_id,
            cabin_id,
        })
    }

    async fn find_booking(&self, booking_id: i64) -> Result<Option<BookingRecord>, CruiseError> {
        Ok(self
            .state()
            .bookings
            .iter()
            .find(|booking| booking.booking_id == booking_id)
            .cloned())
    }

    async fn active_facilities(&self) -> Result<Vec<Facility>, CruiseError> {
        Ok(self
            .state()
            .facilities
            .iter()
            .filter(|facility| facility.is_active())
            .cloned()
            .collect())
    }

    async fn find_facility_preferences(
        &self,
        booking_id: i64,
    ) -> Result<Vec<FacilityPreference>, CruiseError> {
        let mut sessions: Vec<FacilityPreference> = self
            .state()
            .facility_preferences
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|p| p.id);
        Ok(sessions)
    }

    async fn insert_facility_preference(
        &self,
        preference: NewFacilityPreference,
    ) -> Result<i64, CruiseError> {
        let mut state = self.state();
        let id = state.next_id("facility_preferences");
        state
            .facility_preferences
            .push(FacilityPreference::new(id, preference, Utc::now()));
        Ok(id)
    }

    async fn settle_pending_facilities(
        &self,
        booking_id: i64,
        card: Option<&MaskedCard>,
    ) -> Result<u64, CruiseError> {
        let now = Utc::now();
        let mut state = self.state();
        let mut settled = 0;
        for session in state.facility_preferences.iter_mut().filter(|p| {
            p.booking_id == booking_id && p.payment_status == FacilityPaymentStatus::Pending
        }) {
            session.payment_status = FacilityPaymentStatus::Paid;
            session.card_num = card.map(|c| c.card_num.clone());
            session.card_type = card.map(|c| c.card_type.clone());
            session.updated_at = now;
            settled += 1;
        }
        Ok(settled)
    }

    async fn cancel_facilities(&self, booking_id: i64) -> Result<u64, CruiseError> {
        let now = Utc::now();
        let mut state = self.state();
        let mut cancelled = 0;
        for session in state
            .facility_preferences
            .iter_mut()
            .filter(|p| p.booking_id == booking_id)
        {
            session.payment_status = FacilityPaymentStatus::Cancelled;
            session.updated_at = now;
            cancelled += 1;
        }
        Ok(cancelled)
    }

    async fn insert_passengers(
        &self,
        passengers: Vec<NewPassenger>,
    ) -> Result<Vec<i64>, CruiseError> {
        let mut state = self.state();
        let mut ids = Vec::with_capacity(passengers.len());
        for passenger in passengers {
            let passenger_id = state.next_id("passenger_management");
            state
                .passengers
                .push(PassengerRecord::new(passenger_id, passenger, Utc::now()));
            ids.push(passenger_id);
        }
        Ok(ids)
    }

    async fn find_passenger(
        &self,
        passenger_id: i64,
    ) -> Result<Option<PassengerRecord>, CruiseError> {
        Ok(self
            .state()
            .passengers
            .iter()
            .find(|p| p.passenger_id == passenger_id)
            .cloned())
    }

    async fn delete_passenger(&self, passenger_id: i64) -> Result<bool, CruiseError> {
        let mut state = self.state();
        let before = state.passengers.len();
        state.passengers.retain(|p| p.passenger_id != passenger_id);
        Ok(state.passengers.len() < before)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<UserProfile>, CruiseError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn update_user_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<bool, CruiseError> {
        let mut state = self.state();
        match state.users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => {
                user.full_name = update.full_name.clone();
                user.date_of_birth = update.date_of_birth.clone();
                user.gender = Some(update.gender.clone());
                user.phone_number = Some(update.phone_number.clone());
                user.passport_number = Some(update.passport_number.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

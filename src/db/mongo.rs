use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use log::{error, info, warn};
use mongodb::{
    bson::{doc, Bson, Document},
    options::{ClientOptions, ReturnDocument, ServerApi, ServerApiVersion},
    Client, ClientSession, Collection, Database,
};
use serde::Deserialize;

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

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, CruiseError> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => info!("Connected to MongoDB and verified with ping command"),
        Err(e) => {
            warn!("Connected to MongoDB but ping test failed: {}", e);
            warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Ok(Arc::new(client))
}

#[derive(Debug, Deserialize)]
struct Counter {
    seq: i64,
}

/// `CruiseStore` backed by one MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    client: Arc<Client>,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Arc<Client>, database_name: &str) -> Self {
        let db = client.database(database_name);
        Self { client, db }
    }

    fn ships(&self) -> Collection<Ship> {
        self.db.collection("ship_details")
    }

    fn itineraries(&self) -> Collection<Itinerary> {
        self.db.collection("itineraries")
    }

    fn pricing(&self) -> Collection<CabinTypePricing> {
        self.db.collection("cabin_type_pricing")
    }

    fn bookings(&self) -> Collection<BookingRecord> {
        self.db.collection("booking_overview")
    }

    fn cabins(&self) -> Collection<CabinRecord> {
        self.db.collection("cabin_management")
    }

    fn passengers(&self) -> Collection<PassengerRecord> {
        self.db.collection("passenger_management")
    }

    fn users(&self) -> Collection<UserProfile> {
        self.db.collection("users")
    }

    fn facilities(&self) -> Collection<Facility> {
        self.db.collection("facilities")
    }

    fn facility_preferences(&self) -> Collection<FacilityPreference> {
        self.db.collection("facility_preferences")
    }

    fn counters(&self) -> Collection<Counter> {
        self.db.collection("counters")
    }

    async fn next_id(&self, sequence: &str) -> Result<i64, CruiseError> {
        let counter = self
            .counters()
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;
        counter
            .map(|c| c.seq)
            .ok_or_else(|| CruiseError::Database(format!("sequence {} was not created", sequence)))
    }

    async fn next_id_in(
        &self,
        session: &mut ClientSession,
        sequence: &str,
    ) -> Result<i64, CruiseError> {
        let counter = self
            .counters()
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .session(&mut *session)
            .await?;
        counter
            .map(|c| c.seq)
            .ok_or_else(|| CruiseError::Database(format!("sequence {} was not created", sequence)))
    }

    async fn insert_cabin_in(
        &self,
        session: &mut ClientSession,
        booking_id: i64,
        cabin: NewCabinRecord,
    ) -> Result<i64, CruiseError> {
        let cabin_id = self.next_id_in(session, "cabin_management").await?;
        let record = CabinRecord::new(cabin_id, booking_id, cabin);
        self.cabins()
            .insert_one(&record)
            .session(&mut *session)
            .await?;
        Ok(cabin_id)
    }
}

fn contains_filter(text: &str) -> Document {
    doc! { "$regex": regex::escape(text), "$options": "i" }
}

/// Name search against `ship_details`, used when no ship id narrows the
/// catalogue.
fn ship_name_query(filter: &PricingFilter) -> Option<Document> {
    match (filter.ship_id, filter.ship_name.as_deref()) {
        (Some(id), _) if id > 0 => None,
        (_, Some(name)) if !name.is_empty() => Some(doc! { "ship_name": contains_filter(name) }),
        _ => None,
    }
}

fn pricing_query(filter: &PricingFilter) -> Document {
    let mut query = doc! {};

    if let Some(id) = filter.ship_id.filter(|id| *id > 0) {
        query.insert("ship_id", id);
    }

    if let Some(route) = filter.route.as_deref().filter(|r| !r.is_empty()) {
        query.insert("route", contains_filter(route));
    }

    if filter.min_price > 0.0 {
        let any_above: Vec<Bson> = RoomType::ALL
            .iter()
            .map(|room_type| {
                let mut bound = Document::new();
                bound.insert(room_type.price_column(), doc! { "$gte": filter.min_price });
                Bson::Document(bound)
            })
            .collect();
        query.insert("$or", any_above);
    }

    if filter.max_price > 0.0 {
        for room_type in RoomType::ALL {
            query.insert(room_type.price_column(), doc! { "$lte": filter.max_price });
        }
    }

    query
}

async fn abort(session: &mut ClientSession, what: &str) {
    if let Err(err) = session.abort_transaction().await {
        error!("Rollback of {} failed: {}", what, err);
    }
}

fn count_from(document: &Document, key: &str) -> u32 {
    match document.get(key) {
        Some(Bson::Int32(n)) => (*n).max(0) as u32,
        Some(Bson::Int64(n)) => (*n).max(0) as u32,
        _ => 0,
    }
}

#[async_trait]
impl CruiseStore for MongoStore {
    async fn ping(&self) -> Result<(), CruiseError> {
        self.db.run_command(doc! {"ping": 1}).await?;
        Ok(())
    }

    async fn find_ship_by_id(&self, ship_id: i64) -> Result<Option<Ship>, CruiseError> {
        Ok(self.ships().find_one(doc! { "ship_id": ship_id }).await?)
    }

    async fn find_ship_by_name(&self, ship_name: &str) -> Result<Option<Ship>, CruiseError> {
        Ok(self.ships().find_one(doc! { "ship_name": ship_name }).await?)
    }

    async fn find_pricing(
        &self,
        key: ShipKey<'_>,
        route: &str,
    ) -> Result<Option<CabinTypePricing>, CruiseError> {
        let filter = match key {
            ShipKey::Id(ship_id) => doc! { "ship_id": ship_id, "route": route },
            ShipKey::Name(ship_name) => doc! { "ship_name": ship_name, "route": route },
        };
        Ok(self.pricing().find_one(filter).await?)
    }

    async fn search_pricing(
        &self,
        filter: &PricingFilter,
    ) -> Result<Vec<PricingListing>, CruiseError> {
        let mut query = pricing_query(filter);
        if let Some(name_query) = ship_name_query(filter) {
            let named: Vec<Ship> = self.ships().find(name_query).await?.try_collect().await?;
            if named.is_empty() {
                return Ok(Vec::new());
            }
            let ids: Vec<i64> = named.iter().map(|ship| ship.ship_id).collect();
            query.insert("ship_id", doc! { "$in": ids });
        }

        let rows: Vec<CabinTypePricing> = self
            .pricing()
            .find(query)
            .await?
            .try_collect()
            .await?;

        let ship_ids: Vec<i64> = rows.iter().filter_map(|row| row.ship_id).collect();
        if ship_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ships: HashMap<i64, Ship> = self
            .ships()
            .find(doc! { "ship_id": { "$in": ship_ids.clone() } })
            .await?
            .try_collect::<Vec<Ship>>()
            .await?
            .into_iter()
            .map(|ship| (ship.ship_id, ship))
            .collect();

        let itineraries: HashMap<(i64, String), Itinerary> = self
            .itineraries()
            .find(doc! { "ship_id": { "$in": ship_ids.clone() } })
            .await?
            .try_collect::<Vec<Itinerary>>()
            .await?
            .into_iter()
            .filter_map(|it| it.ship_id.map(|id| ((id, it.route.clone()), it)))
            .collect();

        let mut listings: Vec<PricingListing> = rows
            .into_iter()
            .filter_map(|row| {
                let ship_id = row.ship_id?;
                let ship = ships.get(&ship_id)?;
                let itinerary = itineraries.get(&(ship_id, row.route.clone()))?;
                Some(PricingListing {
                    ship_id,
                    ship_name: ship.ship_name.clone(),
                    route: row.route,
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
        self.pricing().insert_one(pricing).await?;
        Ok(())
    }

    async fn itinerary_exists(&self, ship_id: i64, route: &str) -> Result<bool, CruiseError> {
        let found = self
            .itineraries()
            .find_one(doc! { "ship_id": ship_id, "route": route })
            .await?;
        Ok(found.is_some())
    }

    async fn find_itinerary(
        &self,
        ship_name: &str,
        route: &str,
    ) -> Result<Option<Itinerary>, CruiseError> {
        Ok(self
            .itineraries()
            .find_one(doc! { "ship_name": ship_name, "route": route })
            .await?)
    }

    async fn find_itinerary_duration(
        &self,
        ship_name: &str,
        route: &str,
    ) -> Result<Option<u32>, CruiseError> {
        let itinerary = self
            .itineraries()
            .find_one(doc! { "ship_name": ship_name, "route": route })
            .await?;
        Ok(itinerary.and_then(|it| it.duration_days))
    }

    async fn count_bookings_by_room_type(
        &self,
        ship_id: Option<i64>,
        ship_name: &str,
        route: &str,
    ) -> Result<HashMap<RoomType, u32>, CruiseError> {
        let matcher = match ship_id {
            Some(id) => doc! {
                "$or": [ { "ship_id": id }, { "ship_name": ship_name } ],
                "destination": route,
            },
            None => doc! { "ship_name": ship_name, "destination": route },
        };
        let pipeline = vec![
            doc! { "$match": matcher },
            doc! { "$group": { "_id": "$room_type", "booked_count": { "$sum": 1 } } },
        ];

        let mut cursor = self.bookings().aggregate(pipeline).await?;
        let mut counts = HashMap::new();
        while let Some(group) = cursor.try_next().await? {
            let label = group.get_str("_id").unwrap_or_default();
            match label.parse::<RoomType>() {
                Ok(room_type) => {
                    counts.insert(room_type, count_from(&group, "booked_count"));
                }
                Err(_) => warn!("Ignoring bookings with unknown room type '{}'", label),
            }
        }
        Ok(counts)
    }

    async fn cabin_number_taken(
        &self,
        ship_name: &str,
        cabin_number: &str,
    ) -> Result<bool, CruiseError> {
        let existing = self
            .cabins()
            .find_one(doc! { "cruise_name": ship_name, "cabin_number": cabin_number })
            .await?;
        Ok(existing.is_some())
    }

    async fn create_booking(
        &self,
        booking: NewBooking,
        cabin: NewCabinRecord,
    ) -> Result<BookingReceipt, CruiseError> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        let booking_id = match self.next_id_in(&mut session, "booking_overview").await {
            Ok(id) => id,
            Err(err) => {
                abort(&mut session, "booking id allocation").await;
                return Err(err);
            }
        };

        let record = BookingRecord::new(booking_id, booking, Utc::now());
        if let Err(err) = self.bookings().insert_one(&record).session(&mut session).await {
            abort(&mut session, &format!("booking {}", booking_id)).await;
            return Err(err.into());
        }

        match self.insert_cabin_in(&mut session, booking_id, cabin).await {
            Ok(cabin_id) => {
                session.commit_transaction().await?;
                Ok(BookingReceipt {
                    booking_id,
                    cabin_id,
                })
            }
            Err(err) => {
                error!(
                    "Cabin record for booking {} failed, rolling back: {}",
                    booking_id, err
                );
                abort(&mut session, &format!("booking {}", booking_id)).await;
                Err(CruiseError::PartialBookingFailure {
                    booking_id,
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn find_booking(&self, booking_id: i64) -> Result<Option<BookingRecord>, CruiseError> {
        Ok(self
            .bookings()
            .find_one(doc! { "booking_id": booking_id })
            .await?)
    }

    async fn active_facilities(&self) -> Result<Vec<Facility>, CruiseError> {
        Ok(self
            .facilities()
            .find(doc! { "status": "active" })
            .await?
            .try_collect()
            .await?)
    }

    async fn find_facility_preferences(
        &self,
        booking_id: i64,
    ) -> Result<Vec<FacilityPreference>, CruiseError> {
        Ok(self
            .facility_preferences()
            .find(doc! { "booking_id": booking_id })
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?)
    }

    async fn insert_facility_preference(
        &self,
        preference: NewFacilityPreference,
    ) -> Result<i64, CruiseError> {
        let id = self.next_id("facility_preferences").await?;
        let record = FacilityPreference::new(id, preference, Utc::now());
        self.facility_preferences().insert_one(&record).await?;
        Ok(id)
    }

    async fn settle_pending_facilities(
        &self,
        booking_id: i64,
        card: Option<&MaskedCard>,
    ) -> Result<u64, CruiseError> {
        let mut changes = doc! {
            "payment_status": FacilityPaymentStatus::Paid.as_str(),
            "updated_at": bson::to_bson(&Utc::now())?,
        };
        match card {
            Some(card) => {
                changes.insert("card_num", card.card_num.as_str());
                changes.insert("card_type", card.card_type.as_str());
            }
            None => {
                changes.insert("card_num", Bson::Null);
                changes.insert("card_type", Bson::Null);
            }
        }
        let result = self
            .facility_preferences()
            .update_many(
                doc! {
                    "booking_id": booking_id,
                    "payment_status": FacilityPaymentStatus::Pending.as_str(),
                },
                doc! { "$set": changes },
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn cancel_facilities(&self, booking_id: i64) -> Result<u64, CruiseError> {
        let result = self
            .facility_preferences()
            .update_many(
                doc! { "booking_id": booking_id },
                doc! { "$set": {
                    "payment_status": FacilityPaymentStatus::Cancelled.as_str(),
                    "updated_at": bson::to_bson(&Utc::now())?,
                } },
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn insert_passengers(
        &self,
        passengers: Vec<NewPassenger>,
    ) -> Result<Vec<i64>, CruiseError> {
        let mut records = Vec::with_capacity(passengers.len());
        for passenger in passengers {
            let passenger_id = self.next_id("passenger_management").await?;
            records.push(PassengerRecord::new(passenger_id, passenger, Utc::now()));
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.passengers().insert_many(&records).await?;
        Ok(records.iter().map(|record| record.passenger_id).collect())
    }

    async fn find_passenger(
        &self,
        passenger_id: i64,
    ) -> Result<Option<PassengerRecord>, CruiseError> {
        Ok(self
            .passengers()
            .find_one(doc! { "passenger_id": passenger_id })
            .await?)
    }

    async fn delete_passenger(&self, passenger_id: i64) -> Result<bool, CruiseError> {
        let result = self
            .passengers()
            .delete_one(doc! { "passenger_id": passenger_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<UserProfile>, CruiseError> {
        Ok(self.users().find_one(doc! { "id": user_id }).await?)
    }

    async fn update_user_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<bool, CruiseError> {
        let changes = bson::to_document(update)?;
        let result = self
            .users()
            .update_one(doc! { "id": user_id }, doc! { "$set": changes })
            .await?;
        Ok(result.matched_count > 0)
    }
}

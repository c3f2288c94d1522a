use log::info;
use serde::Serialize;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        passenger::{
            AddPassengersRequest, CreatePassengerRequest, NewPassenger, PassengerBooking,
            ShipGuard,
        },
        ship::ShipRef,
    },
    services::ship_resolver::ShipResolver,
};

pub const PASSENGER_NOT_FOUND: &str = "Passenger not found or ship validation failed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedPassenger {
    pub name: String,
    pub ship_id: Option<i64>,
    pub ship_name: String,
    pub route: String,
}

fn missing(field: &str) -> CruiseError {
    CruiseError::Validation(format!("Missing field: {}", field))
}

/// Checks the booking-level fields and resolves the ship they point at.
async fn passenger_booking(
    store: &dyn CruiseStore,
    booking_id: Option<i64>,
    ship_id: Option<i64>,
    ship_name: Option<&str>,
    route: Option<&str>,
    cabin_id: Option<i64>,
) -> Result<PassengerBooking, CruiseError> {
    let booking_id = booking_id.filter(|id| *id > 0).ok_or_else(|| missing("booking_id"))?;
    let route = route
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .ok_or_else(|| missing("route"))?;
    let cabin_id = cabin_id.filter(|id| *id > 0).ok_or_else(|| missing("cabin_id"))?;
    let reference = ShipRef::from_parts(ship_id, ship_name).ok_or_else(|| {
        CruiseError::Validation("Either ship_id or ship_name is required".to_string())
    })?;

    let ship = ShipResolver::resolve(store, &reference).await?;
    Ok(PassengerBooking {
        booking_id,
        ship_id: ship.id,
        ship_name: ship.name,
        route: route.to_string(),
        cabin_id,
    })
}

pub struct PassengerService;

impl PassengerService {
    /// Adds one non-primary passenger to a booking.
    pub async fn create(
        store: &dyn CruiseStore,
        request: CreatePassengerRequest,
    ) -> Result<i64, CruiseError> {
        let details = request.details.validate()?;
        let booking = passenger_booking(
            store,
            request.booking_id,
            request.ship_id,
            request.ship_name.as_deref(),
            request.route.as_deref(),
            request.cabin_id,
        )
        .await?;

        let ids = store
            .insert_passengers(vec![NewPassenger::new(&booking, details, false)])
            .await?;
        let passenger_id = ids
            .first()
            .copied()
            .ok_or_else(|| CruiseError::Database("Failed to create passenger".to_string()))?;

        info!(
            "Passenger {} added to booking {}",
            passenger_id, booking.booking_id
        );
        Ok(passenger_id)
    }

    /// Adds a list of passengers; the first one becomes the primary passenger.
    pub async fn add_batch(
        store: &dyn CruiseStore,
        request: AddPassengersRequest,
    ) -> Result<Vec<i64>, CruiseError> {
        if request.passenger_list.is_empty() {
            return Err(missing("passengerList"));
        }
        let booking = passenger_booking(
            store,
            request.booking_id,
            request.ship_id,
            request.ship_name.as_deref(),
            request.route.as_deref(),
            request.cabin_id,
        )
        .await?;

        let passengers = request
            .passenger_list
            .iter()
            .enumerate()
            .map(|(idx, details)| {
                details
                    .validate()
                    .map(|valid| NewPassenger::new(&booking, valid, idx == 0))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ids = store.insert_passengers(passengers).await?;
        info!(
            "{} passengers added to booking {}",
            ids.len(),
            booking.booking_id
        );
        Ok(ids)
    }

    /// Removes a passenger, optionally only when it sails on the guarded ship.
    pub async fn delete(
        store: &dyn CruiseStore,
        passenger_id: i64,
        guard: &ShipGuard,
    ) -> Result<DeletedPassenger, CruiseError> {
        if passenger_id <= 0 {
            return Err(CruiseError::Validation("Missing passenger id".to_string()));
        }

        let passenger = store
            .find_passenger(passenger_id)
            .await?
            .filter(|passenger| guard.permits(passenger))
            .ok_or_else(|| CruiseError::NotFound(PASSENGER_NOT_FOUND.to_string()))?;

        if !store.delete_passenger(passenger_id).await? {
            return Err(CruiseError::NotFound(PASSENGER_NOT_FOUND.to_string()));
        }

        info!("Passenger {} removed", passenger_id);
        Ok(DeletedPassenger {
            name: passenger.passenger_name,
            ship_id: passenger.ship_id,
            ship_name: passenger.ship_name,
            route: passenger.route,
        })
    }
}

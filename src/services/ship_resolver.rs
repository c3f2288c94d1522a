use log::debug;
use serde::Serialize;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::ship::{Ship, ShipRef},
};

/// Which lookup produced a `ResolvedShip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipResolution {
    ById,
    ByName,
    /// The name matched no ship record; only the caller's name is known.
    NameOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedShip {
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip)]
    pub passenger_count: Option<u32>,
    #[serde(skip)]
    pub resolution: ShipResolution,
}

impl ResolvedShip {
    fn from_record(ship: Ship, resolution: ShipResolution) -> Self {
        Self {
            id: Some(ship.ship_id),
            name: ship.ship_name,
            passenger_count: Some(ship.passenger_count),
            resolution,
        }
    }
}

pub struct ShipResolver;

impl ShipResolver {
    /// Resolves an id or a name to an (id, name) pair.
    ///
    /// An unknown id is `ShipNotFound`. An unknown name is not an error: the
    /// name is kept and the id stays `None` so later lookups can go by name.
    pub async fn resolve(
        store: &dyn CruiseStore,
        reference: &ShipRef,
    ) -> Result<ResolvedShip, CruiseError> {
        match reference {
            ShipRef::Id(id) => store
                .find_ship_by_id(*id)
                .await?
                .map(|ship| ResolvedShip::from_record(ship, ShipResolution::ById))
                .ok_or_else(|| CruiseError::ShipNotFound(reference.to_string())),
            ShipRef::Name(name) => match store.find_ship_by_name(name).await? {
                Some(ship) => Ok(ResolvedShip::from_record(ship, ShipResolution::ByName)),
                None => {
                    debug!("Ship {} has no record, continuing by name only", reference);
                    Ok(ResolvedShip {
                        id: None,
                        name: name.clone(),
                        passenger_count: None,
                        resolution: ShipResolution::NameOnly,
                    })
                }
            },
        }
    }

    /// Like `resolve`, but the ship record must exist either way.
    pub async fn find_record(
        store: &dyn CruiseStore,
        reference: &ShipRef,
    ) -> Result<Ship, CruiseError> {
        let found = match reference {
            ShipRef::Id(id) => store.find_ship_by_id(*id).await?,
            ShipRef::Name(name) => store.find_ship_by_name(name).await?,
        };
        found.ok_or_else(|| CruiseError::ShipNotFound(reference.to_string()))
    }
}

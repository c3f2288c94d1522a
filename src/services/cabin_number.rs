use log::warn;
use rand::Rng;

use crate::{db::store::CruiseStore, error::CruiseError, models::room_type::RoomType};

pub const MAX_CABIN_NUMBER_ATTEMPTS: usize = 50;

/// `<prefix><001-999>` for a room-type label. Unknown labels get the `G` prefix.
pub fn random_cabin_number<R: Rng + ?Sized>(label: &str, rng: &mut R) -> String {
    format!(
        "{}{:03}",
        RoomType::prefix_for_label(label),
        rng.gen_range(1..=999)
    )
}

/// Draws random cabin numbers until one is not yet assigned on `ship_name`.
pub async fn assign_cabin_number(
    store: &dyn CruiseStore,
    ship_name: &str,
    room_type: RoomType,
) -> Result<String, CruiseError> {
    for _ in 0..MAX_CABIN_NUMBER_ATTEMPTS {
        // ThreadRng is !Send, keep it out of the await below
        let candidate = random_cabin_number(room_type.label(), &mut rand::thread_rng());
        if !store.cabin_number_taken(ship_name, &candidate).await? {
            return Ok(candidate);
        }
    }

    warn!(
        "No free {} cabin number on {} after {} attempts",
        room_type, ship_name, MAX_CABIN_NUMBER_ATTEMPTS
    );
    Err(CruiseError::CabinNumberExhausted {
        ship_name: ship_name.to_string(),
        room_type,
        attempts: MAX_CABIN_NUMBER_ATTEMPTS,
    })
}

use log::info;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::user::{ProfileUpdate, ProfileUpdateRequest, UserProfile},
};

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Splits a request into the target user id and the trimmed field values.
fn validate_update(request: ProfileUpdateRequest) -> Result<(i64, ProfileUpdate), CruiseError> {
    let user_id = request
        .id
        .filter(|id| *id > 0)
        .ok_or_else(|| CruiseError::Validation("Invalid user ID provided".to_string()))?;

    let full_name = trimmed(request.full_name);
    if full_name.is_empty() {
        return Err(CruiseError::Validation("Full name is required".to_string()));
    }

    let date_of_birth = Some(trimmed(request.date_of_birth)).filter(|dob| !dob.is_empty());

    Ok((
        user_id,
        ProfileUpdate {
            full_name,
            date_of_birth,
            gender: trimmed(request.gender),
            phone_number: trimmed(request.phone_number),
            passport_number: trimmed(request.passport_number),
        },
    ))
}

pub struct ProfileService;

impl ProfileService {
    /// Applies a profile update and returns the stored user afterwards.
    pub async fn update(
        store: &dyn CruiseStore,
        request: ProfileUpdateRequest,
    ) -> Result<UserProfile, CruiseError> {
        let (user_id, update) = validate_update(request)?;

        if store.find_user(user_id).await?.is_none() {
            return Err(CruiseError::NotFound("User not found".to_string()));
        }
        if !store.update_user_profile(user_id, &update).await? {
            return Err(CruiseError::NotFound("User not found".to_string()));
        }

        info!("Profile updated for user {}", user_id);
        store
            .find_user(user_id)
            .await?
            .ok_or_else(|| {
                CruiseError::Database("Failed to retrieve updated profile data".to_string())
            })
    }
}

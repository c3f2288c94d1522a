use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub passport_number: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub id: Option<i64>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub passport_number: Option<String>,
}

/// Editable profile fields. The email address is not one of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: String,
    pub phone_number: String,
    pub passport_number: String,
}

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        response::Envelope,
        user::{ProfileUpdateRequest, UserProfile},
    },
    services::profile_service::ProfileService,
};

#[derive(Serialize)]
struct UpdatedProfile {
    data: UserProfile,
}

/// POST /api/profile
pub async fn update_profile(
    store: web::Data<dyn CruiseStore>,
    input: web::Json<ProfileUpdateRequest>,
) -> Result<HttpResponse, CruiseError> {
    let user = ProfileService::update(store.get_ref(), input.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .json(Envelope::ok(UpdatedProfile { data: user }).with_message("Profile updated successfully")))
}

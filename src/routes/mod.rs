use actix_web::web;

use crate::error::CruiseError;

pub mod availability;
pub mod bookings;
pub mod facilities;
pub mod health;
pub mod passengers;
pub mod pricing;
pub mod profile;

fn bad_request(message: String) -> actix_web::Error {
    CruiseError::Validation(message).into()
}

/// Route table shared by the server binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        bad_request(format!("Invalid request body: {}", err))
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        bad_request(format!("Invalid query parameters: {}", err))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        bad_request(format!("Invalid path: {}", err))
    }))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api")
            .route("/pricing", web::get().to(pricing::get_pricing))
            .service(
                web::resource("/cabin-pricing")
                    .route(web::get().to(pricing::search_cabin_pricing))
                    .route(web::post().to(pricing::add_cabin_pricing)),
            )
            .route(
                "/cabin-availability",
                web::get().to(availability::get_cabin_availability),
            )
            .service(
                web::scope("/bookings")
                    .route("", web::post().to(bookings::create_booking))
                    .route(
                        "/confirmation",
                        web::post().to(bookings::send_booking_confirmation),
                    ),
            )
            .service(
                web::scope("/facilities")
                    .route("", web::get().to(facilities::list_facilities))
                    .route(
                        "/bookings",
                        web::post().to(facilities::process_facility_booking),
                    )
                    .route(
                        "/preferences",
                        web::get().to(facilities::get_facility_preferences),
                    ),
            )
            .service(
                web::scope("/passengers")
                    .route("", web::post().to(passengers::create_passenger))
                    .route("/batch", web::post().to(passengers::add_passengers))
                    .route("/{id}", web::delete().to(passengers::delete_passenger)),
            )
            .route("/profile", web::post().to(profile::update_profile)),
    );
}

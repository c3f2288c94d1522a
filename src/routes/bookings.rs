use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::error;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        bookings::BookingRequest,
        response::{Empty, Envelope},
    },
    services::{
        booking_service::BookingService,
        confirmation_service::{send_confirmation, ConfirmationRequest},
        mail_service::Mailer,
    },
};

/// POST /api/bookings
pub async fn create_booking(
    store: web::Data<dyn CruiseStore>,
    input: web::Json<BookingRequest>,
) -> Result<HttpResponse, CruiseError> {
    let confirmation = BookingService::create(store.get_ref(), input.into_inner(), Utc::now())
        .await
        .map_err(|err| {
            if let CruiseError::PartialBookingFailure { booking_id, reason } = &err {
                error!("Booking {} rolled back: {}", booking_id, reason);
            }
            err
        })?;

    Ok(HttpResponse::Ok().json(Envelope::ok(confirmation).with_message("Booking added successfully")))
}

/// POST /api/bookings/confirmation
pub async fn send_booking_confirmation(
    mailer: web::Data<dyn Mailer>,
    input: web::Json<ConfirmationRequest>,
) -> Result<HttpResponse, CruiseError> {
    send_confirmation(mailer.get_ref(), input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(
        Envelope::ok(Empty::default())
            .with_message("Booking confirmation email sent successfully."),
    ))
}

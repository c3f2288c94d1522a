use log::warn;
use serde::Deserialize;

use crate::{error::CruiseError, services::mail_service::Mailer};

pub const CONFIRMATION_SUBJECT: &str = "Your Serendip Waves Booking Confirmation";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmationRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub booking_id: Option<i64>,
    pub total_price: Option<f64>,
    pub cruise_title: Option<String>,
    pub cabin_type: Option<String>,
    pub cabin_number: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub ship_name: Option<String>,
    pub destination: Option<String>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub special_requests: Option<String>,
}

/// Confirmation request with its required fields checked and defaults filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationDetails {
    pub email: String,
    pub full_name: String,
    pub booking_id: i64,
    pub total_price: f64,
    pub cruise_title: String,
    pub cabin_type: String,
    pub cabin_number: String,
    pub departure_date: String,
    pub return_date: String,
    pub ship_name: String,
    pub destination: String,
    pub adults: u32,
    pub children: u32,
    pub special_requests: String,
}

fn missing(field: &str) -> CruiseError {
    CruiseError::Validation(format!("Missing required field: {}", field))
}

fn required(value: Option<String>, field: &str) -> Result<String, CruiseError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(field))
}

impl TryFrom<ConfirmationRequest> for ConfirmationDetails {
    type Error = CruiseError;

    fn try_from(request: ConfirmationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: required(request.email, "email")?,
            full_name: required(request.full_name, "full_name")?,
            booking_id: request.booking_id.ok_or_else(|| missing("booking_id"))?,
            total_price: request.total_price.ok_or_else(|| missing("total_price"))?,
            cruise_title: request
                .cruise_title
                .unwrap_or_else(|| "Luxury Cruise Experience".to_string()),
            cabin_type: request.cabin_type.unwrap_or_default(),
            cabin_number: request.cabin_number.unwrap_or_default(),
            departure_date: request.departure_date.unwrap_or_default(),
            return_date: request.return_date.unwrap_or_default(),
            ship_name: request.ship_name.unwrap_or_default(),
            destination: request.destination.unwrap_or_default(),
            adults: request.adults.unwrap_or(1),
            children: request.children.unwrap_or(0),
            special_requests: request
                .special_requests
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "None".to_string()),
        })
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<tr><td><strong>{}:</strong></td><td>{}</td></tr>",
        label,
        escape_html(value)
    )
}

pub fn render_confirmation(details: &ConfirmationDetails) -> String {
    let booking_rows = [
        row("Booking ID", &format!("#{}", details.booking_id)),
        row("Full Name", &details.full_name),
        row("Email", &details.email),
        row("Cruise Title", &details.cruise_title),
        row("Cabin Type", &details.cabin_type),
        row("Cabin Number", &details.cabin_number),
        row("Number of Adults", &details.adults.to_string()),
        row("Number of Children", &details.children.to_string()),
        row("Departure Date", &details.departure_date),
        row("Return Date", &details.return_date),
        row("Total Price", &format!("{:.2}", details.total_price)),
    ]
    .concat();
    let cruise_rows = [
        row("Ship Name", &details.ship_name),
        row("Destination", &details.destination),
    ]
    .concat();

    format!(
        "<html><body>\
         <h1>Booking Confirmed!</h1>\
         <p>Dear {name},</p>\
         <p>Thank you for choosing <strong>Serendip Waves</strong>. Your booking is confirmed.</p>\
         <h3>Booking Details</h3><table>{booking_rows}</table>\
         <h3>Cruise Information</h3><table>{cruise_rows}</table>\
         <h3>Special Requests</h3><p>{requests}</p>\
         <p>Best regards,<br><strong>Serendip Waves Booking Team</strong></p>\
         </body></html>",
        name = escape_html(&details.full_name),
        booking_rows = booking_rows,
        cruise_rows = cruise_rows,
        requests = escape_html(&details.special_requests),
    )
}

/// Renders and mails the booking confirmation.
pub async fn send_confirmation(
    mailer: &dyn Mailer,
    request: ConfirmationRequest,
) -> Result<(), CruiseError> {
    let details = ConfirmationDetails::try_from(request)?;
    let body = render_confirmation(&details);
    mailer
        .deliver(&details.email, CONFIRMATION_SUBJECT, &body)
        .await
        .map_err(|err| {
            warn!(
                "Confirmation for booking {} not sent: {}",
                details.booking_id, err
            );
            err
        })
}

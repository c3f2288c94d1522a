use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::{
    db::store::CruiseStore,
    error::CruiseError,
    models::{
        facility::{
            CardDetails, Facility, FacilityAction, FacilityBookingRequest, FacilityPaymentStatus,
            FacilityPreference, FacilityQuantities, FacilitySelection, MaskedCard,
            NewFacilityPreference,
        },
        room_type::RoomType,
    },
    services::{confirmation_service::escape_html, mail_service::Mailer},
};

const DEFAULT_UNIT: &str = "access";

/// Facilities the dashboard still knows about after they left the price list.
const LEGACY_FACILITIES: [(&str, &str, f64, &str); 6] = [
    ("spa_access", "Spa Access", 30.0, "access"),
    ("wifi", "WiFi Access", 25.0, "access"),
    ("private_cabana_rental", "Private Cabana Rental", 150.0, "access"),
    ("specialty_dining", "Specialty Dining", 75.0, "access"),
    ("laundry_service", "Laundry Service", 45.0, "access"),
    ("room_service", "Room Service", 25.0, "service"),
];

const CONFIRMED_SUBJECT: &str = "Facility Booking Payment Confirmation - Serendip Waves";
const PENDING_SUBJECT: &str = "Facility Booking Saved - Payment Pending - Serendip Waves";
const CANCELLED_SUBJECT: &str = "Facility Booking Cancelled - Serendip Waves";

#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRate {
    pub name: String,
    pub unit_price: f64,
    pub unit: String,
}

/// Price list keyed by facility code.
#[derive(Debug, Clone, Default)]
pub struct FacilityCatalogue {
    rates: HashMap<String, FacilityRate>,
}

impl FacilityCatalogue {
    pub fn from_active(facilities: &[Facility]) -> Self {
        let rates = facilities
            .iter()
            .map(|facility| {
                (
                    facility.code(),
                    FacilityRate {
                        name: facility.facility.clone(),
                        unit_price: facility.unit_price,
                        unit: DEFAULT_UNIT.to_string(),
                    },
                )
            })
            .collect();
        Self { rates }
    }

    /// Adds the legacy facilities the price list does not already carry.
    pub fn with_legacy_facilities(mut self) -> Self {
        for (code, name, unit_price, unit) in LEGACY_FACILITIES {
            self.rates
                .entry(code.to_string())
                .or_insert_with(|| FacilityRate {
                    name: name.to_string(),
                    unit_price,
                    unit: unit.to_string(),
                });
        }
        self
    }

    pub fn get(&self, code: &str) -> Option<&FacilityRate> {
        self.rates.get(code)
    }

    pub fn name_of(&self, code: &str) -> String {
        self.get(code)
            .map(|rate| rate.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// Priced lines for the selected facilities the catalogue knows. Unknown
    /// codes are skipped.
    pub fn lines(
        &self,
        selected: &FacilitySelection,
        quantities: &FacilityQuantities,
    ) -> Vec<FacilityLine> {
        selected
            .iter()
            .filter(|(_, is_selected)| **is_selected)
            .filter_map(|(code, _)| {
                let rate = self.get(code)?;
                let quantity = quantities.get(code).copied().unwrap_or(1);
                Some(FacilityLine {
                    code: code.clone(),
                    name: rate.name.clone(),
                    quantity,
                    unit_price: rate.unit_price,
                    total_price: rate.unit_price * f64::from(quantity),
                    unit: rate.unit.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityLine {
    pub code: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub unit: String,
}

impl FacilityLine {
    pub fn unit_text(&self) -> String {
        if self.unit_price > 0.0 {
            format!("per {}", self.unit)
        } else {
            "Free".to_string()
        }
    }
}

pub fn total_of(lines: &[FacilityLine]) -> f64 {
    lines.iter().map(|line| line.total_price).sum()
}

/// Masks the card to its last four digits. A missing card type is guessed
/// from the first digit.
pub fn mask_card(details: &CardDetails) -> Option<MaskedCard> {
    let number: String = details
        .card_number
        .as_deref()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if number.is_empty() {
        return None;
    }

    let last_four: String = number
        .chars()
        .skip(number.chars().count().saturating_sub(4))
        .collect();
    let card_type = match details
        .card_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        Some(supplied) => capitalize(supplied),
        None => match number.chars().next() {
            Some('4') => "Visa",
            Some('5') => "Mastercard",
            Some('3') => "American Express",
            _ => "Unknown",
        }
        .to_string(),
    };

    Some(MaskedCard {
        card_num: format!("**** **** **** {}", last_four),
        card_type,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityPrice {
    pub facility_id: i64,
    pub code: String,
    pub name: String,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityBookingOutcome {
    #[serde(skip)]
    pub message: String,
    pub facility_details: Vec<FacilityLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

impl FacilityBookingOutcome {
    fn new(message: String, facility_details: Vec<FacilityLine>) -> Self {
        Self {
            message,
            facility_details,
            total_paid: None,
            email_sent: None,
            email_error: None,
        }
    }
}

/// Payment state across all sessions of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityAccountStatus {
    Pending,
    Paid,
    Partial,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilitySession {
    pub id: i64,
    pub facilities: FacilitySelection,
    pub quantities: FacilityQuantities,
    pub cost: f64,
    pub payment_status: FacilityPaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionFacilityLine {
    #[serde(flatten)]
    pub line: FacilityLine,
    pub unit_text: String,
    pub session_id: i64,
    pub session_index: usize,
    pub payment_status: FacilityPaymentStatus,
    pub booked_at: DateTime<Utc>,
}

/// Everything the customer dashboard shows about a booking's facilities.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityPreferenceSummary {
    pub booking_id: i64,
    pub passenger_name: Option<String>,
    pub passenger_email: Option<String>,
    pub ship_name: Option<String>,
    pub destination: Option<String>,
    pub room_type: Option<RoomType>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub trip_duration: Option<i64>,
    pub journey_completed: bool,
    pub payment_status: FacilityAccountStatus,
    pub selected_facilities: FacilitySelection,
    pub booking_sessions: Vec<FacilitySession>,
    pub facility_details: Vec<SessionFacilityLine>,
    pub total_facilities: usize,
    pub total_cost: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub can_modify: bool,
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, "%Y-%m-%d").ok()
}

/// Rejects a selection that repeats facilities already paid for on this
/// booking.
fn ensure_not_paid(
    sessions: &[FacilityPreference],
    selected: &FacilitySelection,
    catalogue: &FacilityCatalogue,
) -> Result<(), CruiseError> {
    let paid: BTreeSet<&str> = sessions
        .iter()
        .filter(|session| session.payment_status == FacilityPaymentStatus::Paid)
        .flat_map(|session| session.selected_codes())
        .collect();
    let repeated: Vec<String> = selected
        .iter()
        .filter(|(code, is_selected)| **is_selected && paid.contains(code.as_str()))
        .map(|(code, _)| catalogue.name_of(code))
        .collect();
    if repeated.is_empty() {
        Ok(())
    } else {
        Err(CruiseError::FacilitiesAlreadyPaid(repeated))
    }
}

/// Facility lines summed per code over the given sessions.
fn combined_lines(
    sessions: &[FacilityPreference],
    catalogue: &FacilityCatalogue,
) -> Vec<FacilityLine> {
    let mut combined: BTreeMap<String, FacilityLine> = BTreeMap::new();
    for session in sessions {
        for line in catalogue.lines(&session.selected_facilities, &session.quantities) {
            match combined.get_mut(&line.code) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                    existing.total_price += line.total_price;
                }
                None => {
                    combined.insert(line.code.clone(), line);
                }
            }
        }
    }
    combined.into_values().collect()
}

pub fn render_facility_mail(
    heading: &str,
    passenger_name: &str,
    booking_id: i64,
    lines: &[FacilityLine],
    total: f64,
) -> String {
    let rows: String = lines
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2} {}</td><td>{:.2}</td></tr>",
                escape_html(&line.name),
                line.quantity,
                line.unit_price,
                escape_html(&line.unit_text()),
                line.total_price
            )
        })
        .collect();
    format!(
        "<html><body>\
         <h1>{heading}</h1>\
         <p>Dear {name},</p>\
         <p>Facility booking for cruise booking <strong>#{booking_id}</strong>.</p>\
         <table><tr><th>Facility</th><th>Quantity</th><th>Unit Price</th><th>Total</th></tr>{rows}</table>\
         <p><strong>Total: {total:.2}</strong></p>\
         <p>Best regards,<br><strong>Serendip Waves</strong></p>\
         </body></html>",
        heading = escape_html(heading),
        name = escape_html(passenger_name),
        booking_id = booking_id,
        rows = rows,
        total = total,
    )
}

pub struct FacilityService;

impl FacilityService {
    /// Active facilities with their codes, by name.
    pub async fn price_list(store: &dyn CruiseStore) -> Result<Vec<FacilityPrice>, CruiseError> {
        let mut prices: Vec<FacilityPrice> = store
            .active_facilities()
            .await?
            .into_iter()
            .map(|facility| FacilityPrice {
                facility_id: facility.facility_id,
                code: facility.code(),
                name: facility.facility,
                unit_price: facility.unit_price,
            })
            .collect();
        prices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(prices)
    }

    /// Runs one facility booking action and mails the passenger when an
    /// address was given.
    pub async fn process(
        store: &dyn CruiseStore,
        mailer: &dyn Mailer,
        request: FacilityBookingRequest,
    ) -> Result<FacilityBookingOutcome, CruiseError> {
        let (Some(booking_id), Some(action)) = (
            request.booking_id.filter(|id| *id > 0),
            present(&request.action),
        ) else {
            return Err(CruiseError::Validation("Missing required fields".to_string()));
        };
        let action: FacilityAction = action.parse()?;

        let booking = store
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| CruiseError::NotFound("Booking not found".to_string()))?;
        let passenger_name = present(&request.passenger_name)
            .unwrap_or(booking.full_name.as_str())
            .to_string();

        let catalogue = FacilityCatalogue::from_active(&store.active_facilities().await?);
        let requested = catalogue.lines(&request.selected_facilities, &request.quantities);
        let sessions = store.find_facility_preferences(booking_id).await?;

        let (subject, mut outcome) = match action {
            FacilityAction::Confirm => {
                let card = request.card_details.as_ref().and_then(mask_card);
                let mut settled = store
                    .settle_pending_facilities(booking_id, card.as_ref())
                    .await?;
                if settled == 0 {
                    if requested.is_empty() {
                        return Err(CruiseError::Validation(
                            "No pending facility bookings to confirm".to_string(),
                        ));
                    }
                    ensure_not_paid(&sessions, &request.selected_facilities, &catalogue)?;
                    store
                        .insert_facility_preference(NewFacilityPreference {
                            booking_id,
                            passenger_name: passenger_name.clone(),
                            selected_facilities: request.selected_facilities.clone(),
                            quantities: request.quantities.clone(),
                            total_cost: total_of(&requested),
                            payment_status: FacilityPaymentStatus::Paid,
                            card,
                        })
                        .await?;
                    settled = 1;
                }

                let paid: Vec<FacilityPreference> = store
                    .find_facility_preferences(booking_id)
                    .await?
                    .into_iter()
                    .filter(|session| session.payment_status == FacilityPaymentStatus::Paid)
                    .collect();
                let total_paid: f64 = paid.iter().map(|session| session.total_cost).sum();
                info!(
                    "Confirmed {} facility session(s) for booking {}, {:.2} paid in total",
                    settled, booking_id, total_paid
                );

                let mut outcome = FacilityBookingOutcome::new(
                    format!(
                        "Payment confirmed for {} facility booking(s). Total paid: ${:.2}",
                        settled, total_paid
                    ),
                    combined_lines(&paid, &catalogue),
                );
                outcome.total_paid = Some(total_paid);
                (CONFIRMED_SUBJECT, outcome)
            }
            FacilityAction::SavePending => {
                if requested.is_empty() {
                    return Err(CruiseError::Validation(
                        "Select at least one available facility".to_string(),
                    ));
                }
                let pending: f64 = sessions
                    .iter()
                    .filter(|session| session.payment_status == FacilityPaymentStatus::Pending)
                    .map(|session| session.total_cost)
                    .sum();
                if pending > 0.0 {
                    return Err(CruiseError::PendingFacilityBalance(pending));
                }
                ensure_not_paid(&sessions, &request.selected_facilities, &catalogue)?;

                let id = store
                    .insert_facility_preference(NewFacilityPreference {
                        booking_id,
                        passenger_name: passenger_name.clone(),
                        selected_facilities: request.selected_facilities.clone(),
                        quantities: request.quantities.clone(),
                        total_cost: total_of(&requested),
                        payment_status: FacilityPaymentStatus::Pending,
                        card: None,
                    })
                    .await?;
                info!("Saved pending facility session {} for booking {}", id, booking_id);
                (
                    PENDING_SUBJECT,
                    FacilityBookingOutcome::new(
                        "Facility preferences saved as pending!".to_string(),
                        requested,
                    ),
                )
            }
            FacilityAction::Cancel => {
                let cancelled = store.cancel_facilities(booking_id).await?;
                info!(
                    "Cancelled {} facility session(s) for booking {}",
                    cancelled, booking_id
                );
                (
                    CANCELLED_SUBJECT,
                    FacilityBookingOutcome::new(
                        "Facility booking cancelled successfully!".to_string(),
                        requested,
                    ),
                )
            }
        };

        if let Some(email) = present(&request.passenger_email) {
            if !outcome.facility_details.is_empty() {
                let total = outcome
                    .total_paid
                    .unwrap_or_else(|| total_of(&outcome.facility_details));
                let body = render_facility_mail(
                    subject,
                    &passenger_name,
                    booking_id,
                    &outcome.facility_details,
                    total,
                );
                match mailer.deliver(email, subject, &body).await {
                    Ok(()) => outcome.email_sent = Some(true),
                    Err(err) => {
                        warn!("Facility mail for booking {} not sent: {}", booking_id, err);
                        outcome.email_sent = Some(false);
                        outcome.email_error = Some(err.to_string());
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Facility sessions of a booking with per-line prices and payment
    /// totals, newest session first.
    pub async fn preferences(
        store: &dyn CruiseStore,
        booking_id: i64,
        today: NaiveDate,
    ) -> Result<FacilityPreferenceSummary, CruiseError> {
        let mut sessions = store.find_facility_preferences(booking_id).await?;
        if sessions.is_empty() {
            return Err(CruiseError::NotFound(
                "No facility preferences found for this booking".to_string(),
            ));
        }
        sessions.reverse();

        let booking = store.find_booking(booking_id).await?;
        let itinerary = match &booking {
            Some(booking) => {
                store
                    .find_itinerary(&booking.ship_name, &booking.destination)
                    .await?
            }
            None => None,
        };
        let catalogue = FacilityCatalogue::from_active(&store.active_facilities().await?)
            .with_legacy_facilities();

        let facility_details: Vec<SessionFacilityLine> = sessions
            .iter()
            .enumerate()
            .flat_map(|(index, session)| {
                catalogue
                    .lines(&session.selected_facilities, &session.quantities)
                    .into_iter()
                    .map(move |line| SessionFacilityLine {
                        unit_text: line.unit_text(),
                        line,
                        session_id: session.id,
                        session_index: index + 1,
                        payment_status: session.payment_status,
                        booked_at: session.created_at,
                    })
            })
            .collect();

        let amount_with = |status: FacilityPaymentStatus| -> f64 {
            facility_details
                .iter()
                .filter(|detail| detail.payment_status == status)
                .map(|detail| detail.line.total_price)
                .sum()
        };
        let paid_amount = amount_with(FacilityPaymentStatus::Paid);
        let pending_amount = amount_with(FacilityPaymentStatus::Pending);
        let total_cost: f64 = facility_details.iter().map(|d| d.line.total_price).sum();

        let has_paid = sessions
            .iter()
            .any(|s| s.payment_status == FacilityPaymentStatus::Paid);
        let has_pending = sessions
            .iter()
            .any(|s| s.payment_status == FacilityPaymentStatus::Pending);
        let payment_status = match (has_paid, has_pending) {
            (true, true) => FacilityAccountStatus::Partial,
            (true, false) => FacilityAccountStatus::Paid,
            (false, true) => FacilityAccountStatus::Pending,
            (false, false) => FacilityAccountStatus::Cancelled,
        };

        let departure_date = itinerary.as_ref().and_then(|it| it.start_date.clone());
        let return_date = itinerary.as_ref().and_then(|it| it.end_date.clone());
        let departure = parse_date(departure_date.as_deref());
        let arrival = parse_date(return_date.as_deref());
        let trip_duration = match (departure, arrival) {
            (Some(start), Some(end)) => Some((end - start).num_days().abs()),
            _ => None,
        };
        let journey_completed = arrival.is_some_and(|end| end < today);

        let selected_facilities: FacilitySelection = sessions
            .iter()
            .flat_map(|session| session.selected_codes())
            .map(|code| (code.to_string(), true))
            .collect();
        let booking_sessions = sessions
            .iter()
            .map(|session| FacilitySession {
                id: session.id,
                facilities: session.selected_facilities.clone(),
                quantities: session.quantities.clone(),
                cost: session.total_cost,
                payment_status: session.payment_status,
                created_at: session.created_at,
            })
            .collect();

        Ok(FacilityPreferenceSummary {
            booking_id,
            passenger_name: booking.as_ref().map(|b| b.full_name.clone()),
            passenger_email: booking.as_ref().map(|b| b.email.clone()),
            ship_name: booking.as_ref().map(|b| b.ship_name.clone()),
            destination: booking.as_ref().map(|b| b.destination.clone()),
            room_type: booking.as_ref().map(|b| b.room_type),
            adults: booking.as_ref().map(|b| b.adults),
            children: booking.as_ref().map(|b| b.children),
            departure_date,
            return_date,
            trip_duration,
            journey_completed,
            payment_status,
            selected_facilities,
            booking_sessions,
            total_facilities: facility_details.len(),
            facility_details,
            total_cost,
            paid_amount,
            pending_amount,
            can_modify: !journey_completed && payment_status != FacilityAccountStatus::Paid,
        })
    }
}

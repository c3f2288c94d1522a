pub mod booking_service;
pub mod cabin_number;
pub mod capacity_service;
pub mod card_expiry;
pub mod confirmation_service;
pub mod facility_service;
pub mod mail_service;
pub mod passenger_service;
pub mod pricing_service;
pub mod profile_service;
pub mod ship_resolver;

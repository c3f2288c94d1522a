pub mod bookings;
pub mod facility;
pub mod passenger;
pub mod pricing;
pub mod response;
pub mod room_type;
pub mod ship;
pub mod user;

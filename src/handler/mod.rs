pub mod auth;
pub mod bookings;
pub mod opportunities;
pub mod services;
pub mod users;

//! Domain layer: registrations, connect options and errors.

pub mod errors;
pub mod registration;

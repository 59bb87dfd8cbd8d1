//! Domain layer: profiles, wallet entries and errors.

pub mod errors;
pub mod profile;
pub mod wallet;

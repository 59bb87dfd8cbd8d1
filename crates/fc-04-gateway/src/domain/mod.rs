//! Domain layer: options and errors.

pub mod errors;
pub mod options;

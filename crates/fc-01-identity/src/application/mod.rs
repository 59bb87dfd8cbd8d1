//! Application layer: bootstrap and context handles.

pub mod context;

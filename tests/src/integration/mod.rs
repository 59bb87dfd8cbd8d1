//! Cross-crate flows. Each module holds its tests in a `tests` submodule.

pub mod event_flow;
pub mod gateway_flow;
pub mod runtime_flow;
pub mod submission_flow;

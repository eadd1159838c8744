//! Telemetry
//!
//! Audit records produced by the flow for the host to persist.

pub mod audit;

pub use audit::*;

//! Builders
//!
//! Fluent builder for relying-party configuration.

pub mod config;

pub use config::{client_config, ClientConfigBuilder};

//! OIDC Types
//!
//! Core type definitions for the relying-party flow.

pub mod auth;
pub mod callback;
pub mod config;
pub mod identity;
pub mod token;
pub mod userinfo;

pub use auth::*;
pub use callback::*;
pub use config::*;
pub use identity::*;
pub use token::*;
pub use userinfo::*;

//! OIDC Core Components
//!
//! Core infrastructure: HTTP transport, discovery, endpoint resolution and
//! request-bound random values.

pub mod discovery;
pub mod endpoint;
pub mod state;
pub mod transport;

pub use discovery::*;
pub use endpoint::*;
pub use state::*;
pub use transport::*;

//! OIDC Flows
//!
//! The relying-party authorization code flow, split into its steps:
//!
//! - **Authorization request**: redirect URL for the start leg
//! - **Token exchange**: authorization code for tokens
//! - **UserInfo retrieval**: claims fetch with the identity URL fallback
//! - **Identity assembly**: canonical identity record
//! - **Callback orchestration**: [`OpenIdConnectFlow`] state machine

pub mod authorization;
pub mod callback;
pub mod identity;
pub mod token;
pub mod userinfo;

pub use authorization::build_authorization_url;

pub use callback::{create_mock_flow, MockProviders, OpenIdConnectFlow, ProviderClients};

pub use identity::assemble_identity;

pub use token::{DefaultTokenExchanger, MockTokenExchanger, TokenExchanger};

pub use userinfo::{
    DefaultUserInfoClient, MockUserInfoClient, RetrievedUserInfo, UserInfoClient,
    UserInfoRetriever,
};

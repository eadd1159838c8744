//! Identity Assembly
//!
//! Maps normalized claims and token fields into the identity record handed
//! to the host.

use crate::types::{
    IdentityCredentials, IdentityExtra, IdentityInfo, IdentityRecord, TokenResult, UserInfoResult,
};

/// Build the identity record for a completed flow.
pub fn assemble_identity(
    provider: &str,
    user_info: &UserInfoResult,
    token: &TokenResult,
    redirect_uri: Option<String>,
    audit_record_id: Option<String>,
) -> IdentityRecord {
    IdentityRecord {
        provider: provider.to_string(),
        uid: user_info.uid.clone(),
        info: IdentityInfo {
            first_name: user_info.first_name.clone(),
            last_name: user_info.last_name.clone(),
            email: user_info.email.clone(),
            username: user_info.username.clone(),
            member_type: user_info.member_type.clone(),
        },
        credentials: IdentityCredentials {
            token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_in: token.expires_in,
            expires_at: token.expires_at,
            expires: token.expires(),
            id_token: token.id_token.clone(),
        },
        extra: IdentityExtra {
            raw_info: user_info.raw.as_map().clone(),
            redirect_uri,
            audit_record_id,
        },
    }
}

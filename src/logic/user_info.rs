/*
 * Responsibility
 * - User info returned to the UI, taken from the validated claims
 */
use serde::Serialize;

use crate::security::ApiClaims;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}

impl UserInfo {
    pub fn from_claims(claims: &impl ApiClaims) -> Self {
        let core = claims.core();
        Self {
            given_name: core.given_name().to_string(),
            family_name: core.family_name().to_string(),
            email: core.email().to_string(),
        }
    }
}

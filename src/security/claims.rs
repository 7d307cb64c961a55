/*
 * Responsibility
 * - The validated identity of the caller for one request (CoreApiClaims)
 * - Extension point for APIs that need more than the base claims (ApiClaims)
 *
 * Notes
 * - CoreApiClaims is only built by the authenticator, after every required claim was checked
 */
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreApiClaims {
    user_id: String,
    client_id: String,
    scopes: Vec<String>,
    given_name: String,
    family_name: String,
    email: String,
}

impl CoreApiClaims {
    pub(crate) fn new(
        user_id: String,
        client_id: String,
        scopes: Vec<String>,
        given_name: String,
        family_name: String,
        email: String,
    ) -> Self {
        Self {
            user_id,
            client_id,
            scopes,
            given_name,
            family_name,
            email,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    pub fn given_name(&self) -> &str {
        &self.given_name
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Claims type an API works with.
///
/// `from_claims` receives the already validated core claims plus the raw payload
/// object, so an API can read its own extra fields without re-checking the base ones.
pub trait ApiClaims: Send + Sync + Sized + 'static {
    fn from_claims(core: CoreApiClaims, payload: &Map<String, Value>) -> Result<Self, ApiError>;

    fn core(&self) -> &CoreApiClaims;
}

impl ApiClaims for CoreApiClaims {
    fn from_claims(core: CoreApiClaims, _payload: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(core)
    }

    fn core(&self) -> &CoreApiClaims {
        self
    }
}

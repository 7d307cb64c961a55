//! Reads the claims an upstream authorizer already established and checks them.
//!
//! Signature verification happened upstream; here the payload is only
//! semi-trusted, so every required claim is checked before anything downstream
//! sees it. A missing container is a structural failure (`server_error`); a
//! missing or empty claim is a `claims_failure` naming that claim.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::{ApiError, ErrorUtils};

use super::claims::{ApiClaims, CoreApiClaims};

/// Where a host keeps the authorizer's claims payload.
pub trait ClaimsSource {
    /// `None` when the container is absent.
    fn custom_claims(&self) -> Option<Value>;
}

/// Function-host events carry claims at `requestContext.authorizer.customClaims`.
impl ClaimsSource for Value {
    fn custom_claims(&self) -> Option<Value> {
        self.pointer("/requestContext/authorizer/customClaims")
            .filter(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                _ => true,
            })
            .cloned()
    }
}

#[derive(Debug, Error)]
pub enum ClaimsResolutionError {
    #[error("Unable to resolve authorizer claims from request context")]
    ContainerMissing,
    #[error("Unable to parse authorizer claims from request context: {0}")]
    Unreadable(String),
    #[error("Authorizer claims in request context are not an object")]
    NotAnObject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContextAuthenticator;

impl RequestContextAuthenticator {
    pub fn new() -> Self {
        Self
    }

    /// Read claims passed in by the authorizer and fail on the first missing one.
    pub fn authorize_request_and_get_claims<C: ApiClaims>(
        &self,
        source: &impl ClaimsSource,
    ) -> Result<C, ApiError> {
        let payload = source
            .custom_claims()
            .ok_or(ClaimsResolutionError::ContainerMissing)
            .and_then(read_payload)
            .map_err(|e| ErrorUtils::create_api_error(&anyhow::Error::new(e), None, None))?;

        // Field order is check order.
        let core = CoreApiClaims::new(
            check_claim(&payload, "userId")?,
            check_claim(&payload, "clientId")?,
            check_array_claim(&payload, "scope")?,
            check_claim(&payload, "givenName")?,
            check_claim(&payload, "familyName")?,
            check_claim(&payload, "email")?,
        );

        tracing::debug!(
            user_id = %core.user_id(),
            client_id = %core.client_id(),
            "authorizer claims validated"
        );

        C::from_claims(core, &payload)
    }
}

fn read_payload(value: Value) -> Result<Map<String, Value>, ClaimsResolutionError> {
    let value = match value {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| ClaimsResolutionError::Unreadable(e.to_string()))?,
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ClaimsResolutionError::NotAnObject),
    }
}

fn check_claim(payload: &Map<String, Value>, name: &str) -> Result<String, ApiError> {
    payload
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ErrorUtils::from_missing_claim(name))
}

// An empty array counts as missing, as does any non-string entry.
fn check_array_claim(payload: &Map<String, Value>, name: &str) -> Result<Vec<String>, ApiError> {
    payload
        .get(name)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| ErrorUtils::from_missing_claim(name))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::{CLAIMS_FAILURE, SERVER_ERROR};

    const REQUIRED: [&str; 6] = ["userId", "clientId", "scope", "givenName", "familyName", "email"];

    fn valid_claims() -> Value {
        json!({
            "userId": "u1",
            "clientId": "c1",
            "scope": ["read"],
            "givenName": "A",
            "familyName": "B",
            "email": "a@b.com",
        })
    }

    fn event_with(claims: &Value) -> Value {
        json!({
            "requestContext": {
                "authorizer": {
                    "customClaims": claims.to_string(),
                }
            }
        })
    }

    fn authorize(event: &Value) -> Result<CoreApiClaims, ApiError> {
        RequestContextAuthenticator::new().authorize_request_and_get_claims(event)
    }

    #[test]
    fn valid_payload_yields_matching_claims() {
        let claims = authorize(&event_with(&valid_claims())).unwrap();

        assert_eq!(claims.user_id(), "u1");
        assert_eq!(claims.client_id(), "c1");
        assert_eq!(claims.scopes(), ["read".to_string()]);
        assert_eq!(claims.given_name(), "A");
        assert_eq!(claims.family_name(), "B");
        assert_eq!(claims.email(), "a@b.com");
        assert!(claims.has_scope("read"));
    }

    #[test]
    fn inline_object_payload_is_accepted() {
        let event = json!({
            "requestContext": {"authorizer": {"customClaims": valid_claims()}}
        });

        assert_eq!(authorize(&event).unwrap().user_id(), "u1");
    }

    #[test]
    fn missing_container_is_a_structural_error() {
        for event in [
            json!({}),
            json!({"requestContext": {}}),
            json!({"requestContext": {"authorizer": {}}}),
            json!({"requestContext": {"authorizer": {"customClaims": null}}}),
            json!({"requestContext": {"authorizer": {"customClaims": ""}}}),
        ] {
            let error = authorize(&event).unwrap_err();
            assert_eq!(error.error_code(), SERVER_ERROR);
            assert_eq!(
                error.details(),
                "Unable to resolve authorizer claims from request context"
            );
        }
    }

    #[test]
    fn unreadable_payload_is_a_structural_error() {
        let event = json!({
            "requestContext": {"authorizer": {"customClaims": "{not json"}}
        });
        let error = authorize(&event).unwrap_err();
        assert_eq!(error.error_code(), SERVER_ERROR);

        let event = json!({
            "requestContext": {"authorizer": {"customClaims": "[1, 2]"}}
        });
        let error = authorize(&event).unwrap_err();
        assert_eq!(error.error_code(), SERVER_ERROR);
        assert_ne!(error.error_code(), CLAIMS_FAILURE);
    }

    #[test]
    fn each_missing_claim_is_named() {
        for name in REQUIRED {
            let mut claims = valid_claims();
            claims.as_object_mut().unwrap().remove(name);

            let error = authorize(&event_with(&claims)).unwrap_err();
            assert_eq!(error.error_code(), CLAIMS_FAILURE);
            assert_eq!(
                error.details(),
                format!("An empty value was found for the expected claim {name}")
            );
        }
    }

    #[test]
    fn empty_values_count_as_missing() {
        for name in REQUIRED {
            let mut claims = valid_claims();
            claims[name] = if name == "scope" { json!([]) } else { json!("") };

            let error = authorize(&event_with(&claims)).unwrap_err();
            assert_eq!(error.error_code(), CLAIMS_FAILURE);
            assert!(error.details().ends_with(name));
        }
    }

    #[test]
    fn empty_scope_array_fails_on_scope() {
        let mut claims = valid_claims();
        claims["scope"] = json!([]);

        let error = authorize(&event_with(&claims)).unwrap_err();
        assert_eq!(
            error.details(),
            "An empty value was found for the expected claim scope"
        );
    }

    #[test]
    fn wrongly_typed_claims_count_as_missing() {
        let mut claims = valid_claims();
        claims["userId"] = json!(42);
        let error = authorize(&event_with(&claims)).unwrap_err();
        assert!(error.details().ends_with("userId"));

        let mut claims = valid_claims();
        claims["scope"] = json!(["read", 7]);
        let error = authorize(&event_with(&claims)).unwrap_err();
        assert!(error.details().ends_with("scope"));

        let mut claims = valid_claims();
        claims["scope"] = json!("read write");
        let error = authorize(&event_with(&claims)).unwrap_err();
        assert!(error.details().ends_with("scope"));
    }

    #[test]
    fn validation_stops_at_the_first_missing_claim() {
        let claims = json!({"scope": ["read"]});

        let error = authorize(&event_with(&claims)).unwrap_err();
        assert!(error.details().ends_with("userId"));
    }
}

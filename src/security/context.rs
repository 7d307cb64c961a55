//! Per request / per invocation storage for validated claims.
//!
//! One `RequestContext` is created for each unit of work. The boundary stores
//! the claims once, then everything running later in that unit of work can
//! retrieve them, either from the handle it was given or through
//! [`RequestContext::current`] while inside [`RequestContext::scope`].
//! Nothing is shared between units of work.

use std::any::{Any, type_name};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use super::claims::ApiClaims;
use crate::errors::Failure;

type StoredClaims = Arc<dyn Any + Send + Sync>;

tokio::task_local! {
    static CURRENT_CONTEXT: RequestContext;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("claims were requested outside of a request scope")]
    NotInScope,
    #[error("claims were requested before they were stored")]
    ClaimsNotStored,
    #[error("claims were already stored for this request")]
    AlreadyStored,
    #[error("stored claims are not of type {expected}")]
    TypeMismatch { expected: &'static str },
}

#[derive(Clone, Default)]
pub struct RequestContext {
    claims: Arc<OnceLock<StoredClaims>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the validated claims. Allowed once per request.
    pub fn store<C: ApiClaims>(&self, claims: C) -> Result<Arc<C>, ContextError> {
        let claims = Arc::new(claims);
        self.claims
            .set(claims.clone())
            .map_err(|_| ContextError::AlreadyStored)?;
        Ok(claims)
    }

    pub fn retrieve<C: ApiClaims>(&self) -> Result<Arc<C>, ContextError> {
        let stored = self.claims.get().ok_or(ContextError::ClaimsNotStored)?;
        stored
            .clone()
            .downcast::<C>()
            .map_err(|_| ContextError::TypeMismatch {
                expected: type_name::<C>(),
            })
    }

    pub fn has_claims(&self) -> bool {
        self.claims.get().is_some()
    }

    /// Run `fut` with this context installed as the current one.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT_CONTEXT.scope(self, fut).await
    }

    /// The context of the unit of work the caller is running in.
    pub fn current() -> Result<Self, ContextError> {
        CURRENT_CONTEXT
            .try_with(Clone::clone)
            .map_err(|_| ContextError::NotInScope)
    }

    /// Shorthand for `RequestContext::current()?.retrieve::<C>()`.
    pub fn current_claims<C: ApiClaims>() -> Result<Arc<C>, ContextError> {
        Self::current()?.retrieve()
    }
}

// A context misuse is a programming error: classified as `server_error`.
impl From<ContextError> for Failure {
    fn from(e: ContextError) -> Self {
        Failure::Unexpected(anyhow::Error::new(e))
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("has_claims", &self.has_claims())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::security::{CoreApiClaims, RequestContextAuthenticator};

    fn claims_for(user_id: &str) -> CoreApiClaims {
        let event = json!({
            "requestContext": {"authorizer": {"customClaims": {
                "userId": user_id,
                "clientId": "c1",
                "scope": ["read"],
                "givenName": "A",
                "familyName": "B",
                "email": "a@b.com",
            }}}
        });
        RequestContextAuthenticator::new()
            .authorize_request_and_get_claims(&event)
            .unwrap()
    }

    #[derive(Debug)]
    struct OtherClaims(CoreApiClaims);

    impl ApiClaims for OtherClaims {
        fn from_claims(
            core: CoreApiClaims,
            _payload: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<Self, crate::errors::ApiError> {
            Ok(Self(core))
        }

        fn core(&self) -> &CoreApiClaims {
            &self.0
        }
    }

    #[test]
    fn retrieve_before_store_fails() {
        let ctx = RequestContext::new();
        assert_eq!(
            ctx.retrieve::<CoreApiClaims>().unwrap_err(),
            ContextError::ClaimsNotStored
        );
    }

    #[test]
    fn store_is_allowed_once() {
        let ctx = RequestContext::new();
        ctx.store(claims_for("u1")).unwrap();

        assert_eq!(
            ctx.store(claims_for("u2")).unwrap_err(),
            ContextError::AlreadyStored
        );
        assert_eq!(ctx.retrieve::<CoreApiClaims>().unwrap().user_id(), "u1");
    }

    #[test]
    fn retrieving_the_wrong_type_fails() {
        let ctx = RequestContext::new();
        ctx.store(claims_for("u1")).unwrap();

        assert!(matches!(
            ctx.retrieve::<OtherClaims>(),
            Err(ContextError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn current_fails_outside_a_scope() {
        assert_eq!(RequestContext::current().unwrap_err(), ContextError::NotInScope);
    }

    #[tokio::test]
    async fn clones_share_the_same_slot() {
        let ctx = RequestContext::new();
        let handle = ctx.clone();
        ctx.store(claims_for("u1")).unwrap();

        let claims = handle
            .scope(async { RequestContext::current_claims::<CoreApiClaims>() })
            .await
            .unwrap();
        assert_eq!(claims.user_id(), "u1");
    }

    #[tokio::test]
    async fn concurrent_scopes_are_isolated() {
        async fn unit_of_work(user_id: &'static str) -> String {
            let ctx = RequestContext::new();
            ctx.store(claims_for(user_id)).unwrap();

            ctx.scope(async {
                // Suspend so the two units interleave.
                tokio::time::sleep(Duration::from_millis(5)).await;
                RequestContext::current_claims::<CoreApiClaims>()
                    .unwrap()
                    .user_id()
                    .to_string()
            })
            .await
        }

        let (first, second) = tokio::join!(unit_of_work("alice"), unit_of_work("bob"));
        assert_eq!(first, "alice");
        assert_eq!(second, "bob");
    }
}

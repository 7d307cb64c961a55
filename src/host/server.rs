//! Server host: the exception boundary as an axum middleware.
//!
//! - Claims are read from a header set by the upstream authorizer/gateway
//! - On success a `RequestContext` is stored in request extensions and installed
//!   as the current context while the handler runs
//! - Handlers return `Result<_, Failure>`. `Failure` renders a provisional
//!   response carrying the `ClassifiedError`; the middleware finalizes it (url,
//!   area, log) and writes the caller-safe body
//! - Handler panics are caught here and classified like any other failure

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{FromRequestParts, OriginalUri, State},
    http::{HeaderMap, HeaderName, Request, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use serde_json::Value;

use crate::boundary::ExceptionBoundary;
use crate::errors::{ClassifiedError, ErrorUtils, Failure};
use crate::security::{ApiClaims, ClaimsSource, ContextError, RequestContext};

pub const DEFAULT_CLAIMS_HEADER: &str = "x-authorizer-custom-claims";

/// Claims payload forwarded by the authorizer in a request header.
pub struct HeaderClaims<'a> {
    headers: &'a HeaderMap,
    name: &'a HeaderName,
}

impl<'a> HeaderClaims<'a> {
    pub fn new(headers: &'a HeaderMap, name: &'a HeaderName) -> Self {
        Self { headers, name }
    }
}

impl ClaimsSource for HeaderClaims<'_> {
    fn custom_claims(&self) -> Option<Value> {
        self.headers
            .get(self.name)
            // Claims may carry non-ASCII text.
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
    }
}

pub struct ServerHost<C> {
    boundary: Arc<ExceptionBoundary<C>>,
    claims_header: HeaderName,
}

impl<C> Clone for ServerHost<C> {
    fn clone(&self) -> Self {
        Self {
            boundary: self.boundary.clone(),
            claims_header: self.claims_header.clone(),
        }
    }
}

impl<C: ApiClaims> ServerHost<C> {
    pub fn new(boundary: Arc<ExceptionBoundary<C>>, claims_header: HeaderName) -> Self {
        Self {
            boundary,
            claims_header,
        }
    }

    /// Put every route of `router` behind the exception boundary.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(
            self.clone(),
            boundary_middleware::<C>,
        ))
    }

    fn render(&self, classified: &ClassifiedError) -> Response {
        (
            classified.status_code(),
            Json(self.boundary.response_body(classified)),
        )
            .into_response()
    }
}

async fn boundary_middleware<C: ApiClaims>(
    State(host): State<ServerHost<C>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let url = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.to_string())
        .unwrap_or_else(|| req.uri().to_string());

    let claims = match host
        .boundary
        .authorize(&HeaderClaims::new(req.headers(), &host.claims_header), &url)
    {
        Ok(claims) => claims,
        Err(classified) => return host.render(&classified),
    };

    let ctx = RequestContext::new();
    if let Err(e) = ctx.store(claims) {
        return host.render(&host.boundary.handle_failure(e.into(), &url));
    }

    // middleware -> extractor
    req.extensions_mut().insert(ctx.clone());

    let outcome = AssertUnwindSafe(ctx.scope(next.run(req)))
        .catch_unwind()
        .await;

    match outcome {
        Ok(mut response) => match response.extensions_mut().remove::<ClassifiedError>() {
            Some(classified) => host.render(&host.boundary.finalize(classified, &url)),
            None => response,
        },
        Err(payload) => host.render(&host.boundary.handle_panic(payload, &url)),
    }
}

/// Provisional rendering. Behind [`ServerHost`] the boundary replaces it with
/// the finalized response; without it the body is still caller-safe.
impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.to_response_format(false))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        ErrorUtils::from_exception(self).into_response()
    }
}

/// Handler-side access to the claims stored by the boundary.
pub struct Claims<C>(pub Arc<C>);

impl<S, C> FromRequestParts<S> for Claims<C>
where
    S: Send + Sync,
    C: ApiClaims,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .ok_or(ContextError::NotInScope)?;

        Ok(Claims(ctx.retrieve::<C>()?))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn header_claims_reads_the_configured_header() {
        let name = HeaderName::from_static(DEFAULT_CLAIMS_HEADER);
        let mut headers = HeaderMap::new();

        assert!(HeaderClaims::new(&headers, &name).custom_claims().is_none());

        headers.insert(name.clone(), HeaderValue::from_static(""));
        assert!(HeaderClaims::new(&headers, &name).custom_claims().is_none());

        headers.insert(name.clone(), HeaderValue::from_static("{\"userId\":\"u1\"}"));
        assert_eq!(
            HeaderClaims::new(&headers, &name).custom_claims(),
            Some(Value::String("{\"userId\":\"u1\"}".into()))
        );
    }

    #[test]
    fn header_claims_accept_utf8_values() {
        let name = HeaderName::from_static(DEFAULT_CLAIMS_HEADER);
        let mut headers = HeaderMap::new();
        let payload = "{\"givenName\":\"Zoë\"}";

        headers.insert(
            name.clone(),
            HeaderValue::from_bytes(payload.as_bytes()).unwrap(),
        );
        assert_eq!(
            HeaderClaims::new(&headers, &name).custom_claims(),
            Some(Value::String(payload.into()))
        );
    }
}

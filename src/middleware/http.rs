//! HTTP-level middleware (cross-cutting concerns).
//!
//! Applied to every route of the server host, in front of the exception
//! boundary.
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging / request tracing (TraceLayer)
//! - Body size limits
//! - Global timeouts
//!
//! Layer errors (timeouts, ...) happen outside the boundary, so they are turned
//! into the same ApiError body here.

use axum::Json;
use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::errors::{ApiError, ApiErrorOptions, DEFAULT_MESSAGE, SERVER_ERROR};

pub const REQUEST_TIMEOUT: &str = "request_timeout";

/// Apply HTTP-level middleware to the given Router.
///
/// - Request-Id header: `x-request-id`
/// - Body limit / timeout: from `Config`
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let area = config.api_area.clone();

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(move |err: BoxError| {
            let area = area.clone();
            async move { layer_error_response(&err, area) }
        }))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        // Access log / tracing for all requests.
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}

fn layer_error_response(err: &BoxError, area: String) -> Response {
    let error = if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::from_options(ApiErrorOptions {
            error_code: REQUEST_TIMEOUT.to_string(),
            message: "The request did not complete in time".to_string(),
            status_code: StatusCode::REQUEST_TIMEOUT,
            area,
            details: err.to_string(),
            ..Default::default()
        })
    } else {
        ApiError::from_options(ApiErrorOptions {
            error_code: SERVER_ERROR.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            area,
            details: err.to_string(),
            ..Default::default()
        })
    };

    tracing::error!(
        error_id = error.instance_id(),
        code = error.error_code(),
        record = %error.to_log_format(),
        "request failed in http middleware"
    );

    (error.status_code(), Json(error.to_response_format(false))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_408() {
        let err: BoxError = Box::new(tower::timeout::error::Elapsed::new());
        let response = layer_error_response(&err, "SampleApi".into());
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn other_layer_errors_map_to_500() {
        let err: BoxError = "overloaded".into();
        let response = layer_error_response(&err, "SampleApi".into());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

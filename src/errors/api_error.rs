/*
 * Responsibility
 * - Server-side fault representation (ApiError)
 * - Full log record (stack trace included) and a caller-safe summary derived from it
 * - instance_id is random and only used to correlate a client-visible error with a log entry
 */
use std::backtrace::Backtrace;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{Value, json};
use thiserror::Error;

/// Range for random error ids.
pub const MIN_ERROR_ID: u32 = 10_000;
pub const MAX_ERROR_ID: u32 = 65_535;

pub const SERVER_ERROR: &str = "server_error";
pub const CLAIMS_FAILURE: &str = "claims_failure";

pub fn random_instance_id() -> u32 {
    rand::rng().random_range(MIN_ERROR_ID..=MAX_ERROR_ID)
}

/// Named construction parameters for [`ApiError`].
///
/// `Default` assigns a fresh instance id and the current UTC time, so callers
/// only spell out what they care about:
///
/// ```ignore
/// let error = ApiError::from_options(ApiErrorOptions {
///     message: "Database unavailable".into(),
///     area: "CompanyRepository".into(),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ApiErrorOptions {
    pub error_code: String,
    pub message: String,
    pub status_code: StatusCode,
    pub area: String,
    pub instance_id: u32,
    pub url: String,
    pub time: DateTime<Utc>,
    pub details: String,
    /// `None` captures a backtrace at construction.
    pub stack_trace: Option<String>,
}

impl Default for ApiErrorOptions {
    fn default() -> Self {
        Self {
            error_code: SERVER_ERROR.to_string(),
            message: String::new(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            area: String::new(),
            instance_id: random_instance_id(),
            url: String::new(),
            time: Utc::now(),
            details: String::new(),
            stack_trace: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error_code}: {message}")]
pub struct ApiError {
    error_code: String,
    message: String,
    status_code: StatusCode,
    area: String,
    instance_id: u32,
    url: String,
    time: DateTime<Utc>,
    details: String,
    stack_trace: String,
}

impl ApiError {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_options(ApiErrorOptions {
            error_code: error_code.into(),
            message: message.into(),
            ..Default::default()
        })
    }

    pub fn from_options(options: ApiErrorOptions) -> Self {
        let stack_trace = options
            .stack_trace
            .unwrap_or_else(|| Backtrace::capture().to_string());

        Self {
            error_code: options.error_code,
            message: options.message,
            status_code: options.status_code,
            area: options.area,
            instance_id: options.instance_id,
            url: options.url,
            time: options.time,
            details: options.details,
            stack_trace,
        }
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    // Layers further up may add context as the error propagates.
    pub fn set_area(&mut self, area: impl Into<String>) {
        self.area = area.into();
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        self.details = details.into();
    }

    /// Records the originating url. Only the first url sticks.
    pub fn set_url(&mut self, url: impl Into<String>) {
        if self.url.is_empty() {
            self.url = url.into();
        }
    }

    /// Full record for server-side logs. Never send this to a caller.
    pub fn to_log_format(&self) -> Value {
        json!({
            "statusCode": self.status_code.as_u16(),
            "errorCode": self.error_code,
            "message": self.message,
            "area": self.area,
            "instanceId": self.instance_id,
            "url": self.url,
            "time": self.time.to_rfc3339(),
            "details": self.details,
            "stackTrace": self.stack_trace,
        })
    }

    /// Minimal body for the caller: no stack trace, no url.
    pub fn to_response_format(&self, expose_details: bool) -> Value {
        let mut body = json!({
            "code": self.error_code,
            "message": self.message,
            "area": self.area,
            "id": self.instance_id,
        });

        if expose_details && !self.details.is_empty() {
            body["details"] = Value::String(self.details.clone());
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_server_error_with_id_in_range() {
        let error = ApiError::new(SERVER_ERROR, "boom");

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.error_code(), SERVER_ERROR);
        assert!((MIN_ERROR_ID..=MAX_ERROR_ID).contains(&error.instance_id()));
        assert_eq!(error.to_string(), "server_error: boom");
    }

    #[test]
    fn instance_id_is_stable_once_assigned() {
        let error = ApiError::new(SERVER_ERROR, "boom");
        let id = error.instance_id();
        let cloned = error.clone();

        assert_eq!(cloned.instance_id(), id);
        assert_eq!(error.to_log_format()["instanceId"], json!(id));
        assert_eq!(error.to_response_format(false)["id"], json!(id));
    }

    #[test]
    fn options_override_defaults() {
        let error = ApiError::from_options(ApiErrorOptions {
            message: "Not today".into(),
            status_code: StatusCode::SERVICE_UNAVAILABLE,
            area: "CompanyRepository".into(),
            instance_id: 12345,
            url: "/api/companies".into(),
            stack_trace: Some("frame 0".into()),
            ..Default::default()
        });

        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.instance_id(), 12345);
        assert_eq!(error.area(), "CompanyRepository");
        assert_eq!(error.url(), "/api/companies");
        assert_eq!(error.stack_trace(), "frame 0");
    }

    #[test]
    fn area_and_details_can_be_enriched() {
        let mut error = ApiError::new(SERVER_ERROR, "boom");
        error.set_area("Authorizer");
        error.set_details("more context");
        error.set_url("/first");
        error.set_url("/second");

        assert_eq!(error.area(), "Authorizer");
        assert_eq!(error.details(), "more context");
        assert_eq!(error.url(), "/first");
    }

    #[test]
    fn log_format_always_includes_stack_trace() {
        let error = ApiError::from_options(ApiErrorOptions {
            stack_trace: Some("at handler".into()),
            details: "db timeout".into(),
            ..Default::default()
        });

        let record = error.to_log_format();
        assert_eq!(record["stackTrace"], "at handler");
        assert_eq!(record["details"], "db timeout");
        assert_eq!(record["statusCode"], 500);
    }

    #[test]
    fn response_format_never_includes_stack_trace() {
        let mut error = ApiError::new(SERVER_ERROR, "boom");
        error.set_details("secret detail");

        let hidden = error.to_response_format(false);
        assert!(hidden.get("stackTrace").is_none());
        assert!(hidden.get("details").is_none());
        assert!(hidden.get("url").is_none());

        let exposed = error.to_response_format(true);
        assert!(exposed.get("stackTrace").is_none());
        assert_eq!(exposed["details"], "secret detail");
    }
}

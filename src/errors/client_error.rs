//! Expected, caller-fault errors.
//!
//! `ClientError` is a capability set rather than a base type: anything that can
//! report a 4xx status, render a caller-safe body and render a log record
//! qualifies, wherever it was defined.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

pub trait ClientError: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Expected to be in the 4xx range.
    fn status_code(&self) -> StatusCode;

    /// Body returned to the caller. Must not contain stack traces.
    fn to_response_format(&self) -> Value;

    /// Record written to the server log.
    fn to_log_format(&self) -> Value;
}

/// Stock client error with an explicit status, code and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error_code}: {message}")]
pub struct DefaultClientError {
    status_code: StatusCode,
    error_code: String,
    message: String,
    log_context: Option<String>,
}

impl DefaultClientError {
    pub fn new(
        status_code: StatusCode,
        error_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            error_code: error_code.into(),
            message: message.into(),
            log_context: None,
        }
    }

    pub fn bad_request(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_code, message)
    }

    pub fn not_found(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_code, message)
    }

    /// Extra detail that only goes to the log.
    pub fn with_log_context(mut self, context: impl Into<String>) -> Self {
        self.log_context = Some(context.into());
        self
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ClientError for DefaultClientError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn to_response_format(&self) -> Value {
        json!({
            "code": self.error_code,
            "message": self.message,
        })
    }

    fn to_log_format(&self) -> Value {
        let mut record = json!({
            "statusCode": self.status_code.as_u16(),
            "clientError": self.to_response_format(),
        });

        if let Some(context) = &self.log_context {
            record["context"] = Value::String(context.clone());
        }
        record
    }
}

/// Any `ClientError` packaged as a `std::error::Error`, so it can travel through
/// `anyhow` and still be recognised when classified.
///
/// ```ignore
/// return Err(anyhow::Error::new(ClientErrorBox::new(QuotaExceeded)).context("charging"));
/// ```
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClientErrorBox(Arc<dyn ClientError>);

impl ClientErrorBox {
    pub fn new(error: impl ClientError) -> Self {
        Self(Arc::new(error))
    }

    pub fn into_inner(self) -> Arc<dyn ClientError> {
        self.0
    }
}

impl From<Arc<dyn ClientError>> for ClientErrorBox {
    fn from(error: Arc<dyn ClientError>) -> Self {
        Self(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_format_has_code_and_message_only() {
        let error = DefaultClientError::bad_request("invalid_company_id", "bad id")
            .with_log_context("raw id was 'abc'");

        let body = error.to_response_format();
        assert_eq!(body, json!({"code": "invalid_company_id", "message": "bad id"}));
    }

    #[test]
    fn log_format_carries_status_and_context() {
        let error = DefaultClientError::not_found("company_not_found", "no such company")
            .with_log_context("id=7");

        let record = error.to_log_format();
        assert_eq!(record["statusCode"], 404);
        assert_eq!(record["clientError"]["code"], "company_not_found");
        assert_eq!(record["context"], "id=7");
    }

    #[test]
    fn display_matches_api_error_shape() {
        let error = DefaultClientError::bad_request("invalid_company_id", "bad id");
        assert_eq!(error.to_string(), "invalid_company_id: bad id");

        let boxed = ClientErrorBox::new(error);
        assert_eq!(boxed.to_string(), "invalid_company_id: bad id");
    }
}

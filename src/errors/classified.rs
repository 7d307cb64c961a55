/*
 * Responsibility
 * - Failure: anything business logic (or the framework itself) may fail with
 * - ClassifiedError: the only two shapes a failure may take once it has been classified
 */
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;

use super::api_error::ApiError;
use super::client_error::{ClientError, ClientErrorBox};

/// Error type returned by business logic running behind the exception boundary.
///
/// `?` works directly on `ApiError`, any `ClientError` and `anyhow::Error`.
/// Other error types go through `anyhow` first (`.context(..)` or `Failure::unexpected`).
#[derive(Debug)]
pub enum Failure {
    Api(ApiError),
    Client(Arc<dyn ClientError>),
    Unexpected(anyhow::Error),
}

impl Failure {
    pub fn unexpected(error: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected(error.into())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Api(e) => fmt::Display::fmt(e, f),
            Failure::Client(e) => fmt::Display::fmt(e, f),
            Failure::Unexpected(e) => write!(f, "{e:#}"),
        }
    }
}

impl From<ApiError> for Failure {
    fn from(e: ApiError) -> Self {
        Failure::Api(e)
    }
}

impl<E: ClientError> From<E> for Failure {
    fn from(e: E) -> Self {
        Failure::Client(Arc::new(e))
    }
}

impl From<ClientErrorBox> for Failure {
    fn from(e: ClientErrorBox) -> Self {
        Failure::Client(e.into_inner())
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Unexpected(e)
    }
}

// Re-entering a classified error keeps it as is.
impl From<ClassifiedError> for Failure {
    fn from(e: ClassifiedError) -> Self {
        match e {
            ClassifiedError::Api(e) => Failure::Api(e),
            ClassifiedError::Client(e) => Failure::Client(e),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClassifiedError {
    Api(ApiError),
    Client(Arc<dyn ClientError>),
}

impl ClassifiedError {
    /// Status sent to the caller. A client error that reports a non-4xx status
    /// is answered with 400.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassifiedError::Api(e) => e.status_code(),
            ClassifiedError::Client(e) => {
                let status = e.status_code();
                if status.is_client_error() {
                    status
                } else {
                    StatusCode::BAD_REQUEST
                }
            }
        }
    }

    pub fn to_response_format(&self, expose_details: bool) -> Value {
        match self {
            ClassifiedError::Api(e) => e.to_response_format(expose_details),
            ClassifiedError::Client(e) => e.to_response_format(),
        }
    }

    pub fn to_log_format(&self) -> Value {
        match self {
            ClassifiedError::Api(e) => e.to_log_format(),
            ClassifiedError::Client(e) => e.to_log_format(),
        }
    }

    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            ClassifiedError::Api(e) => Some(e),
            ClassifiedError::Client(_) => None,
        }
    }

    pub fn as_client_error(&self) -> Option<&Arc<dyn ClientError>> {
        match self {
            ClassifiedError::Api(_) => None,
            ClassifiedError::Client(e) => Some(e),
        }
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifiedError::Api(e) => fmt::Display::fmt(e, f),
            ClassifiedError::Client(e) => fmt::Display::fmt(e, f),
        }
    }
}

// Client errors compare by identity: the same instance, not an equal-looking one.
impl PartialEq for ClassifiedError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClassifiedError::Api(a), ClassifiedError::Api(b)) => a == b,
            (ClassifiedError::Client(a), ClassifiedError::Client(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/*
 * Responsibility
 * - Map any caught failure to exactly one of ApiError / ClientError
 * - Dedicated constructors for the failures the framework raises itself
 */
use std::any::Any;
use std::sync::Arc;

use super::api_error::{ApiError, ApiErrorOptions, CLAIMS_FAILURE, SERVER_ERROR};
use super::classified::{ClassifiedError, Failure};
use super::client_error::{ClientErrorBox, DefaultClientError};

pub const DEFAULT_MESSAGE: &str = "An unexpected exception occurred in the API";

pub struct ErrorUtils;

impl ErrorUtils {
    /// Return the failure as a typed error, wrapping it when it is neither kind.
    pub fn from_exception(failure: Failure) -> ClassifiedError {
        match failure {
            Failure::Api(e) => ClassifiedError::Api(e),
            Failure::Client(e) => ClassifiedError::Client(e),
            Failure::Unexpected(e) => Self::from_unexpected(e),
        }
    }

    /// Create an ApiError when the caller already knows how to classify the error.
    pub fn create_api_error(
        error: &anyhow::Error,
        error_code: Option<&str>,
        message: Option<&str>,
    ) -> ApiError {
        ApiError::from_options(ApiErrorOptions {
            error_code: error_code.unwrap_or(SERVER_ERROR).to_string(),
            message: message.unwrap_or(DEFAULT_MESSAGE).to_string(),
            details: Self::exception_details(error),
            stack_trace: Some(error.backtrace().to_string()),
            ..Default::default()
        })
    }

    /// The error raised when an expected claim is absent or empty.
    pub fn from_missing_claim(claim_name: &str) -> ApiError {
        let mut error = ApiError::new(CLAIMS_FAILURE, "Authorization Data Not Found");
        error.set_details(format!(
            "An empty value was found for the expected claim {claim_name}"
        ));
        error
    }

    /// Wrap a panic payload caught at the exception boundary.
    ///
    /// Only string payloads carry usable text; anything else yields empty details.
    pub fn from_panic(payload: &(dyn Any + Send)) -> ApiError {
        let details = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();

        ApiError::from_options(ApiErrorOptions {
            message: DEFAULT_MESSAGE.to_string(),
            details,
            ..Default::default()
        })
    }

    // Errors that travelled through anyhow may still be one of ours, possibly
    // under added context.
    fn from_unexpected(error: anyhow::Error) -> ClassifiedError {
        for cause in error.chain() {
            if let Some(api_error) = cause.downcast_ref::<ApiError>() {
                return ClassifiedError::Api(api_error.clone());
            }
            if let Some(client_error) = cause.downcast_ref::<ClientErrorBox>() {
                return ClassifiedError::Client(client_error.clone().into_inner());
            }
            if let Some(client_error) = cause.downcast_ref::<DefaultClientError>() {
                return ClassifiedError::Client(Arc::new(client_error.clone()));
            }
        }

        ClassifiedError::Api(Self::create_api_error(&error, None, None))
    }

    fn exception_details(error: &anyhow::Error) -> String {
        // `{:#}` includes the cause chain; an empty message stays empty.
        format!("{error:#}")
    }
}

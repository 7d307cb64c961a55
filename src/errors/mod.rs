/*
 * Responsibility
 * - Error model (ApiError / ClientError) and classification (ErrorUtils)
 */
mod api_error;
mod classified;
mod client_error;
mod error_utils;

pub use api_error::{
    ApiError, ApiErrorOptions, CLAIMS_FAILURE, MAX_ERROR_ID, MIN_ERROR_ID, SERVER_ERROR,
    random_instance_id,
};
pub use classified::{ClassifiedError, Failure};
pub use client_error::{ClientError, ClientErrorBox, DefaultClientError};
pub use error_utils::{DEFAULT_MESSAGE, ErrorUtils};

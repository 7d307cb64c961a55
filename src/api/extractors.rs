/*
 * Responsibility
 * - Path parameters as typed ids
 * - Rejections are Failures, so they go through the exception boundary like any handler error
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::errors::{DefaultClientError, Failure};
use crate::logic::parse_company_id;

/// `{company_id}` path segment, validated as a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyId(pub u32);

impl<S> FromRequestParts<S> for CompanyId
where
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                DefaultClientError::bad_request(
                    "invalid_company_id",
                    "The company id must be a positive numeric integer",
                )
                .with_log_context(rejection.body_text())
            })?;

        Ok(Self(parse_company_id(&raw)?))
    }
}

//! Exception boundary: the one place where claims authorization and error
//! classification meet.
//!
//! Per unit of work:
//! `Received -> Authorizing -> {AuthFailed | Authorized} -> Executing -> {Succeeded | Failed -> Classifying}`.
//! Every failure, returned or panicked, before or after a suspension point, is
//! classified and logged exactly once here. Hosts only turn the resulting
//! [`ClassifiedError`] into their native response.

use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;

use crate::errors::{ClassifiedError, ErrorUtils, Failure};
use crate::security::{ApiClaims, ClaimsSource, RequestContext, RequestContextAuthenticator};

#[derive(Debug, Clone, Default)]
pub struct BoundaryConfig {
    /// Area tag given to ApiErrors that do not name one.
    pub area: String,
    /// Include ApiError details in caller responses.
    pub expose_error_details: bool,
}

pub struct ExceptionBoundary<C> {
    authenticator: RequestContextAuthenticator,
    config: BoundaryConfig,
    _claims: PhantomData<fn() -> C>,
}

impl<C: ApiClaims> ExceptionBoundary<C> {
    pub fn new(config: BoundaryConfig) -> Self {
        Self {
            authenticator: RequestContextAuthenticator::new(),
            config,
            _claims: PhantomData,
        }
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    /// Authorize one unit of work. A failure comes back already classified and logged.
    pub fn authorize(&self, source: &impl ClaimsSource, url: &str) -> Result<C, ClassifiedError> {
        self.authenticator
            .authorize_request_and_get_claims(source)
            .map_err(|e| self.handle_failure(e.into(), url))
    }

    pub fn handle_failure(&self, failure: Failure, url: &str) -> ClassifiedError {
        self.finalize(ErrorUtils::from_exception(failure), url)
    }

    pub fn handle_panic(&self, payload: Box<dyn Any + Send>, url: &str) -> ClassifiedError {
        self.finalize(
            ClassifiedError::Api(ErrorUtils::from_panic(payload.as_ref())),
            url,
        )
    }

    /// Add request context to an already classified error and write the log record.
    pub fn finalize(&self, classified: ClassifiedError, url: &str) -> ClassifiedError {
        let classified = match classified {
            ClassifiedError::Api(mut error) => {
                if error.area().is_empty() {
                    error.set_area(self.config.area.clone());
                }
                error.set_url(url);
                ClassifiedError::Api(error)
            }
            client => client,
        };

        log_classified(&classified);
        classified
    }

    /// Caller-safe body for a classified error.
    pub fn response_body(&self, classified: &ClassifiedError) -> Value {
        classified.to_response_format(self.config.expose_error_details)
    }

    /// Run one unit of work: authorize, store claims, then run `logic` with the
    /// request context installed.
    pub async fn execute<T, F, Fut>(
        &self,
        source: &impl ClaimsSource,
        url: &str,
        logic: F,
    ) -> Result<T, ClassifiedError>
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = Result<T, Failure>>,
    {
        let claims = self.authorize(source, url)?;

        let ctx = RequestContext::new();
        ctx.store(claims)
            .map_err(|e| self.handle_failure(e.into(), url))?;

        let handle = ctx.clone();
        let outcome = AssertUnwindSafe(ctx.scope(async move { logic(handle).await }))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => Err(self.handle_failure(failure, url)),
            Err(payload) => Err(self.handle_panic(payload, url)),
        }
    }
}

fn log_classified(classified: &ClassifiedError) {
    match classified {
        ClassifiedError::Api(error) => tracing::error!(
            error_id = error.instance_id(),
            code = error.error_code(),
            area = error.area(),
            status = error.status_code().as_u16(),
            record = %error.to_log_format(),
            "api error"
        ),
        ClassifiedError::Client(error) => {
            let status = error.status_code();
            if !status.is_client_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    "client error reported a non-4xx status, answering 400"
                );
            }
            tracing::warn!(
                status = classified.status_code().as_u16(),
                record = %error.to_log_format(),
                "client error"
            );
        }
    }
}

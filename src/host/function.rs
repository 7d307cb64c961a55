//! Function host: one event in, one proxy-style response out.
//!
//! The event shape is only inspected for the claims container, the path and the
//! request id; everything else belongs to the business logic.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::boundary::ExceptionBoundary;
use crate::errors::{ClassifiedError, Failure};
use crate::security::{ApiClaims, RequestContext};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    /// JSON response for a serializable value.
    pub fn object<T: Serialize>(status: StatusCode, data: &T) -> Result<Self, Failure> {
        let body = serde_json::to_string(data).map_err(Failure::unexpected)?;
        Ok(Self::json(status, body))
    }

    fn json(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([(
            "content-type".to_string(),
            "application/json".to_string(),
        )]);

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

pub struct FunctionHost<C> {
    boundary: Arc<ExceptionBoundary<C>>,
}

impl<C: ApiClaims> FunctionHost<C> {
    pub fn new(boundary: Arc<ExceptionBoundary<C>>) -> Self {
        Self { boundary }
    }

    /// Run one invocation. Always produces exactly one response.
    pub async fn handle<F, Fut>(&self, event: &Value, logic: F) -> FunctionResponse
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = Result<FunctionResponse, Failure>>,
    {
        let url = event_path(event);
        let request_id = event
            .pointer("/requestContext/requestId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = tracing::info_span!("invocation", request_id = %request_id, path = %url);

        async {
            match self.boundary.execute(event, &url, logic).await {
                Ok(response) => {
                    tracing::info!(status = response.status_code, "invocation completed");
                    response
                }
                Err(classified) => self.error_response(&classified),
            }
        }
        .instrument(span)
        .await
    }

    fn error_response(&self, classified: &ClassifiedError) -> FunctionResponse {
        FunctionResponse::json(
            classified.status_code(),
            self.boundary.response_body(classified).to_string(),
        )
    }
}

fn event_path(event: &Value) -> String {
    event
        .get("path")
        .or_else(|| event.get("resource"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

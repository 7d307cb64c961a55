/*
 * Responsibility
 * - Function-host routing: pick the sample logic from the event's `resource`
 * - Runs inside the exception boundary, so claims are already stored in `ctx`
 */
use axum::http::StatusCode;
use serde_json::Value;

use crate::errors::{DefaultClientError, Failure};
use crate::host::FunctionResponse;
use crate::logic::{SampleApiClaims, UserInfo, parse_company_id};
use crate::security::RequestContext;
use crate::state::AppState;

pub async fn dispatch(
    state: &AppState,
    event: &Value,
    ctx: RequestContext,
) -> Result<FunctionResponse, Failure> {
    let claims = ctx.retrieve::<SampleApiClaims>()?;
    let resource = event
        .get("resource")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match resource {
        "/api/userclaims" => {
            FunctionResponse::object(StatusCode::OK, &UserInfo::from_claims(&*claims))
        }
        "/api/companies" => {
            let companies = state
                .companies
                .get_company_list(claims.regions_covered())
                .await;
            FunctionResponse::object(StatusCode::OK, &companies)
        }
        "/api/companies/{id}/transactions" => {
            let raw_id = event
                .pointer("/pathParameters/id")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let company_id = parse_company_id(raw_id)?;

            let transactions = state
                .companies
                .get_company_transactions(company_id, claims.regions_covered())
                .await?;
            FunctionResponse::object(StatusCode::OK, &transactions)
        }
        other => Err(DefaultClientError::not_found(
            "resource_not_found",
            format!("No handler is registered for resource '{other}'"),
        )
        .into()),
    }
}

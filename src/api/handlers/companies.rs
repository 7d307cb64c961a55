/*
 * Responsibility
 * - GET /api/companies, GET /api/companies/{company_id}/transactions
 * - The company id is validated by the CompanyId extractor; an invalid one is a client error (400)
 */
use axum::{Json, extract::State};

use crate::api::extractors::CompanyId;
use crate::errors::Failure;
use crate::host::Claims;
use crate::logic::{Company, CompanyTransactions, SampleApiClaims};
use crate::state::AppState;

pub async fn list_companies(
    State(state): State<AppState>,
    Claims(claims): Claims<SampleApiClaims>,
) -> Json<Vec<Company>> {
    let companies = state
        .companies
        .get_company_list(claims.regions_covered())
        .await;

    Json(companies)
}

pub async fn get_company_transactions(
    State(state): State<AppState>,
    CompanyId(company_id): CompanyId,
    Claims(claims): Claims<SampleApiClaims>,
) -> Result<Json<CompanyTransactions>, Failure> {
    let transactions = state
        .companies
        .get_company_transactions(company_id, claims.regions_covered())
        .await?;

    Ok(Json(transactions))
}

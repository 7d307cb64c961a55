/*
 * Responsibility
 * - URL structure under /api
 * - Every route here sits behind the exception boundary (claims required)
 */
use axum::{Router, routing::get};

use crate::api::handlers::{
    companies::{get_company_transactions, list_companies},
    user_info::get_user_claims,
};
use crate::host::ServerHost;
use crate::logic::SampleApiClaims;
use crate::state::AppState;

pub fn routes(host: &ServerHost<SampleApiClaims>) -> Router<AppState> {
    let router = Router::new()
        .route("/userclaims", get(get_user_claims))
        .route("/companies", get(list_companies))
        .route(
            "/companies/{company_id}/transactions",
            get(get_company_transactions),
        );

    host.apply(router)
}

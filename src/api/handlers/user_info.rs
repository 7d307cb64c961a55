/*
 * Responsibility
 * - GET /api/userclaims: user info for the UI, read from the stored claims
 */
use axum::Json;

use crate::host::Claims;
use crate::logic::{SampleApiClaims, UserInfo};

pub async fn get_user_claims(Claims(claims): Claims<SampleApiClaims>) -> Json<UserInfo> {
    tracing::info!("returning user info");
    Json(UserInfo::from_claims(&*claims))
}

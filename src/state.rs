/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use crate::logic::CompanyService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub companies: Arc<CompanyService>,
}

impl AppState {
    pub fn new(companies: Arc<CompanyService>) -> Self {
        Self { companies }
    }
}

/*
 * Responsibility
 * - Config -> state -> Router assembly for the server host
 * - Exception boundary on /api, HTTP middleware on everything
 * - axum::serve() startup
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};

use crate::api::{self, handlers::health::health};
use crate::boundary::ExceptionBoundary;
use crate::config::{Config, LogFormat};
use crate::host::ServerHost;
use crate::logging::{self, LogTarget};
use crate::logic::{CompanyService, SampleApiClaims};
use crate::middleware;
use crate::state::AppState;

pub async fn run() -> Result<()> {
    logging::init_tracing(LogFormat::from_env(), LogTarget::Stdout);
    let config = Config::from_env()?;
    logging::init_panic_hook();

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let app = build_router(&config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(config: &Config) -> Router {
    let state = AppState::new(Arc::new(CompanyService::with_sample_data()));
    let boundary = Arc::new(ExceptionBoundary::<SampleApiClaims>::new(
        config.boundary_config(),
    ));
    let host = ServerHost::new(boundary, config.claims_header.clone());

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api", api::routes(&host))
        .with_state(state);

    middleware::http::apply(router, config)
}

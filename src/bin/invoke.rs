/*
 * Responsibility
 * - Function host entry point: one event (JSON on stdin) -> one response (JSON on stdout)
 * - Logs go to stderr
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use api_guard::api;
use api_guard::boundary::ExceptionBoundary;
use api_guard::config::{Config, LogFormat};
use api_guard::host::FunctionHost;
use api_guard::logging::{self, LogTarget};
use api_guard::logic::{CompanyService, SampleApiClaims};
use api_guard::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing(LogFormat::from_env(), LogTarget::Stderr);
    let config = Config::from_env()?;
    logging::init_panic_hook();

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("reading event from stdin")?;
    let event: Value = serde_json::from_str(&input).context("event is not valid JSON")?;

    let state = AppState::new(Arc::new(CompanyService::with_sample_data()));
    let host = FunctionHost::new(Arc::new(ExceptionBoundary::<SampleApiClaims>::new(
        config.boundary_config(),
    )));

    let response = host
        .handle(&event, |ctx| api::function::dispatch(&state, &event, ctx))
        .await;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(serde_json::to_string(&response)?.as_bytes())
        .await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/*
 * Responsibility
 * - tracing subscriber setup shared by both hosts
 * - panic hook that surfaces panics through tracing, once
 */
use std::panic;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;
use crate::security::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    // The function host keeps stdout for its response.
    Stderr,
}

pub fn init_tracing(format: LogFormat, target: LogTarget) {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,api_guard=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    let writer = || match target {
        LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let (text, json) = match format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().with_writer(writer())),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(writer())),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

/// Panics inside a unit of work are caught and logged by the exception boundary,
/// so the hook only keeps their location at debug level. Anything else is logged
/// here and then passed to the default hook.
pub fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        if handled_by_boundary() {
            tracing::debug!(location = ?info.location(), "panic inside exception boundary");
            return;
        }

        tracing::error!(%info, "panic");
        default_hook(info);
    }));
}

fn handled_by_boundary() -> bool {
    RequestContext::current().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn boundary_scope_is_detected_from_the_panicking_task() {
        assert!(!handled_by_boundary());

        let inside = RequestContext::new()
            .scope(async { handled_by_boundary() })
            .await;
        assert!(inside);
    }
}

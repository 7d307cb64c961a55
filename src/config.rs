/*
 * Responsibility
 * - Read settings from the environment (.env is honoured)
 * - Validate them (startup fails on invalid values)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;

use crate::boundary::BoundaryConfig;
use crate::host::DEFAULT_CLAIMS_HEADER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Default area tag for ApiErrors raised in this API
    pub api_area: String,
    pub claims_header: HeaderName,
    pub expose_error_details: bool,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let api_area = std::env::var("API_AREA").unwrap_or_else(|_| "SampleApi".to_string());
        if api_area.trim().is_empty() {
            return Err(ConfigError::Missing("API_AREA"));
        }

        let claims_header = std::env::var("CLAIMS_HEADER")
            .unwrap_or_else(|_| DEFAULT_CLAIMS_HEADER.to_string());
        let claims_header = HeaderName::from_str(&claims_header.to_ascii_lowercase())
            .map_err(|_| ConfigError::Invalid("CLAIMS_HEADER"))?;

        // Details stay out of responses in production unless asked for.
        let expose_error_details = match std::env::var("EXPOSE_ERROR_DETAILS") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("EXPOSE_ERROR_DETAILS"))?,
            Err(_) => !app_env.is_production(),
        };

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let body_limit_bytes = std::env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            api_area,
            claims_header,
            expose_error_details,
            request_timeout,
            body_limit_bytes,
        })
    }

    pub fn boundary_config(&self) -> BoundaryConfig {
        BoundaryConfig {
            area: self.api_area.clone(),
            expose_error_details: self.expose_error_details,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! API security and error-handling layer shared by a request/response server
//! host and a per-event function host.
//!
//! - [`security`]: claims placed upstream by an authorizer are read, checked and
//!   stored per unit of work
//! - [`errors`]: every failure ends up as an [`errors::ApiError`] or a
//!   [`errors::ClientError`]
//! - [`boundary`]: authorizes, runs business logic, classifies and logs failures
//! - [`host`]: adapters for axum and for function-style invocations

pub mod api;
pub mod app;
pub mod boundary;
pub mod config;
pub mod errors;
pub mod host;
pub mod logging;
pub mod logic;
pub mod middleware;
pub mod security;
pub mod state;

/*
 * Responsibility
 * - Sample endpoints, for the server host (routes) and the function host (function::dispatch)
 */
pub mod extractors;
pub mod function;
pub mod handlers;
mod routes;

pub use routes::routes;

/*
 * Responsibility
 * - Cross-cutting HTTP layers for the server host
 */
pub mod http;

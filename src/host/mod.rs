/*
 * Responsibility
 * - Host adapters: read the claims location, map classified errors to native responses,
 *   run business logic with the stored claims retrievable
 */
pub mod function;
pub mod server;

pub use function::{FunctionHost, FunctionResponse};
pub use server::{Claims, DEFAULT_CLAIMS_HEADER, HeaderClaims, ServerHost};

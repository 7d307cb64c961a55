/*
 * Responsibility
 * - Claims model, claims authenticator, per-request claims storage
 */
mod authenticator;
mod claims;
mod context;

pub use authenticator::{ClaimsResolutionError, ClaimsSource, RequestContextAuthenticator};
pub use claims::{ApiClaims, CoreApiClaims};
pub use context::{ContextError, RequestContext};

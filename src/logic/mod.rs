/*
 * Responsibility
 * - Sample business logic run behind the exception boundary by both hosts
 */
pub mod companies;
pub mod sample_claims;
pub mod user_info;

pub use companies::{Company, CompanyService, CompanyTransactions, Transaction, parse_company_id};
pub use sample_claims::SampleApiClaims;
pub use user_info::UserInfo;

/*
 * Responsibility
 * - Sample business logic: companies and their investment transactions
 * - In-memory data; results are restricted to the caller's regions
 */
use serde::Serialize;

use crate::errors::{DefaultClientError, Failure};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u32,
    pub name: String,
    pub region: String,
    pub target_usd: u64,
    pub investment_usd: u64,
    pub no_investors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub investor_id: String,
    pub amount_usd: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyTransactions {
    pub company: Company,
    pub transactions: Vec<Transaction>,
}

/// Company ids arrive as path text and must be positive integers.
pub fn parse_company_id(raw: &str) -> Result<u32, DefaultClientError> {
    raw.parse::<u32>().ok().filter(|id| *id > 0).ok_or_else(|| {
        DefaultClientError::bad_request(
            "invalid_company_id",
            "The company id must be a positive numeric integer",
        )
        .with_log_context(format!("received company id '{raw}'"))
    })
}

#[derive(Debug, Clone)]
pub struct CompanyService {
    companies: Vec<Company>,
    transactions: Vec<(u32, Transaction)>,
}

impl CompanyService {
    pub fn new(companies: Vec<Company>, transactions: Vec<(u32, Transaction)>) -> Self {
        Self {
            companies,
            transactions,
        }
    }

    pub fn with_sample_data() -> Self {
        let company = |id, name: &str, region: &str, target_usd, investment_usd, no_investors| {
            Company {
                id,
                name: name.to_string(),
                region: region.to_string(),
                target_usd,
                investment_usd,
                no_investors,
            }
        };
        let transaction = |id: &str, investor_id: &str, amount_usd| Transaction {
            id: id.to_string(),
            investor_id: investor_id.to_string(),
            amount_usd,
        };

        Self::new(
            vec![
                company(1, "Microsoft", "Europe", 70_000, 80_000, 23),
                company(2, "IBM", "USA", 100_000, 120_000, 42),
                company(3, "Apple", "USA", 75_000, 110_000, 28),
                company(4, "Google", "Asia", 90_000, 90_000, 33),
            ],
            vec![
                (1, transaction("1001", "7", 10_000)),
                (1, transaction("1002", "8", 70_000)),
                (2, transaction("2001", "9", 120_000)),
                (3, transaction("3001", "7", 60_000)),
                (3, transaction("3002", "10", 50_000)),
                (4, transaction("4001", "11", 90_000)),
            ],
        )
    }

    pub async fn get_company_list(&self, regions: &[String]) -> Vec<Company> {
        self.companies
            .iter()
            .filter(|c| regions.contains(&c.region))
            .cloned()
            .collect()
    }

    pub async fn get_company_transactions(
        &self,
        id: u32,
        regions: &[String],
    ) -> Result<CompanyTransactions, Failure> {
        // Companies outside the caller's regions look the same as unknown ones.
        let company = self
            .companies
            .iter()
            .find(|c| c.id == id && regions.contains(&c.region))
            .cloned()
            .ok_or_else(|| {
                DefaultClientError::not_found(
                    "company_not_found",
                    format!("Transactions for company {id} were not found for this user"),
                )
            })?;

        let transactions = self
            .transactions
            .iter()
            .filter(|(company_id, _)| *company_id == id)
            .map(|(_, t)| t.clone())
            .collect();

        Ok(CompanyTransactions {
            company,
            transactions,
        })
    }
}

/*
 * Responsibility
 * - Claims for the sample API: the core claims plus the regions the caller may see
 */
use serde_json::{Map, Value};

use crate::errors::ApiError;
use crate::security::{ApiClaims, CoreApiClaims};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleApiClaims {
    core: CoreApiClaims,
    regions_covered: Vec<String>,
}

impl SampleApiClaims {
    pub fn regions_covered(&self) -> &[String] {
        &self.regions_covered
    }
}

impl ApiClaims for SampleApiClaims {
    // regionsCovered is optional: no regions means no companies are visible.
    fn from_claims(core: CoreApiClaims, payload: &Map<String, Value>) -> Result<Self, ApiError> {
        let regions_covered = payload
            .get("regionsCovered")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            core,
            regions_covered,
        })
    }

    fn core(&self) -> &CoreApiClaims {
        &self.core
    }
}

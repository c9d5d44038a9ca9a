use anyhow::{Context, Result};

use intake_core::openfoodfacts::{FoodCandidate, SearchResponse, product_to_candidate};

const SEARCH_URL: &str = "https://world.openfoodfacts.org/cgi/search.pl";
const MAX_CANDIDATES: usize = 5;

pub struct OpenFoodFactsClient {
    client: reqwest::Client,
}

impl OpenFoodFactsClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "intake-server/{} (nutrition ledger)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }

    /// Search by name, returning at most five candidates with their per-100g
    /// reference profiles.
    pub async fn search(&self, query: &str) -> Result<Vec<FoodCandidate>> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", "5"),
                ("fields", "product_name,nutriments"),
            ])
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?;

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse OpenFoodFacts search response")?;

        Ok(data
            .products
            .into_iter()
            .filter_map(product_to_candidate)
            .take(MAX_CANDIDATES)
            .collect())
    }
}

impl Default for OpenFoodFactsClient {
    fn default() -> Self {
        Self::new()
    }
}

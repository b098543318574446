use crate::config::SearchConfig;
use crate::providers::{pooled_client, SERVICE_TIMEOUT};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Retailer domains the search is pinned to. Product pages elsewhere are
/// still usable when a plan passes a URL directly.
const INCLUDE_DOMAINS: &[&str] = &[
    "amazon.com",
    "bestbuy.com",
    "walmart.com",
    "target.com",
    "ebay.com",
];

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_domains: &'a [&'a str],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Thin client for the Tavily web-search API.
pub struct TavilyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

impl TavilyClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: pooled_client(SERVICE_TIMEOUT),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
            max_results: config.max_results,
        }
    }

    pub async fn search(&self, query: &str) -> anyhow::Result<SearchResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("search API key not configured (set TAVILY_API_KEY or search.api_key)");
        };

        let request = SearchRequest {
            api_key,
            query,
            search_depth: "basic",
            max_results: self.max_results,
            include_domains: INCLUDE_DOMAINS,
        };
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .context("search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("search API returned {status}: {body:.200}");
        }

        response
            .json::<SearchResponse>()
            .await
            .context("failed to decode search response")
    }
}

/// Heuristic for whether a URL points at an individual product page rather
/// than a listing, category, or review roundup.
pub fn is_product_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    const PATTERNS: &[&str] = &["/dp/", "/gp/product/", "/itm/", "/ip/", "/site/", "/p/", "/a-"];
    PATTERNS.iter().any(|p| lower.contains(p))
}

/// Product URLs from a result set, best score first, product pages before
/// everything else. Order within each class is preserved.
pub fn extract_product_urls(response: &SearchResponse) -> Vec<String> {
    let mut product: Vec<&SearchHit> = Vec::new();
    let mut other: Vec<&SearchHit> = Vec::new();
    for hit in &response.results {
        if is_product_url(&hit.url) {
            product.push(hit);
        } else {
            other.push(hit);
        }
    }
    product
        .into_iter()
        .chain(other)
        .map(|hit| hit.url.clone())
        .collect()
}

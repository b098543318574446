use crate::config::ScraperConfig;
use crate::utils::{collapse_whitespace, leading_decimal, leading_number, truncate_with_ellipsis};
use anyhow::{bail, Context};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Structured extract of one product page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ProductData {
    /// Whether enough was extracted to be worth feeding downstream.
    pub fn is_substantial(&self) -> bool {
        self.title.is_some() && (self.price.is_some() || self.description.is_some())
    }
}

/// Selector sets tried in order per field. The Amazon-specific ids come
/// first, then generic fallbacks that fit most storefront templates.
const TITLE_SELECTORS: &[&str] = &["#productTitle", "h1[itemprop='name']", "h1.product-title", "h1"];
const PRICE_SELECTORS: &[&str] = &[
    ".a-price .a-offscreen",
    "#priceblock_ourprice",
    "[itemprop='price']",
    ".price",
    "[data-testid='price']",
];
const RATING_SELECTORS: &[&str] = &[
    "#acrPopover .a-icon-alt",
    "[itemprop='ratingValue']",
    ".rating-value",
];
const REVIEW_COUNT_SELECTORS: &[&str] = &[
    "#acrCustomerReviewText",
    "[itemprop='reviewCount']",
    ".review-count",
];
const FEATURE_SELECTORS: &[&str] = &["#feature-bullets li", ".product-features li"];
const DESCRIPTION_SELECTORS: &[&str] = &[
    "#productDescription",
    "[itemprop='description']",
    ".product-description",
    "meta[name='description']",
];
const AVAILABILITY_SELECTORS: &[&str] = &["#availability", "[itemprop='availability']"];
const BRAND_SELECTORS: &[&str] = &["#bylineInfo", "[itemprop='brand']", ".product-brand"];
const CATEGORY_SELECTORS: &[&str] = &["#wayfinding-breadcrumbs_feature_div li a", ".breadcrumb a"];
const IMAGE_SELECTORS: &[&str] = &["#landingImage", ".product-image img", "img[itemprop='image']"];

const MAX_FEATURES: usize = 10;
const MAX_IMAGES: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Fetches product pages over plain HTTP and extracts structured data with
/// CSS selectors. Pages that render everything client-side will come back
/// thin; the record still carries whatever was found.
pub struct PageScraper {
    client: reqwest::Client,
    max_html_bytes: usize,
}

impl PageScraper {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("failed to build scraper HTTP client")?;
        Ok(Self {
            client,
            max_html_bytes: config.max_html_bytes,
        })
    }

    pub async fn scrape(&self, url: &str) -> anyhow::Result<ProductData> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned {status}");
        }

        let mut html = response
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;
        if html.len() > self.max_html_bytes {
            // The limit may land mid-character; back up to a boundary.
            let mut cut = self.max_html_bytes;
            while cut > 0 && !html.is_char_boundary(cut) {
                cut -= 1;
            }
            html.truncate(cut);
        }

        // `Html` is not Send, so parsing stays on this side of the await.
        Ok(extract_from_html(url, &html))
    }
}

fn select_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in doc.select(&selector) {
            if raw.starts_with("meta") {
                if let Some(content) = element.value().attr("content") {
                    let text = collapse_whitespace(content);
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
                continue;
            }
            let text = collapse_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn select_all_text(doc: &Html, selectors: &[&str], limit: usize) -> Vec<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let items: Vec<String> = doc
            .select(&selector)
            .map(|e| collapse_whitespace(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .take(limit)
            .collect();
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

fn select_image_urls(doc: &Html, selectors: &[&str], limit: usize) -> Vec<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let urls: Vec<String> = doc
            .select(&selector)
            .filter_map(|e| e.value().attr("src").or_else(|| e.value().attr("data-src")))
            .map(str::to_string)
            .filter(|src| src.starts_with("http"))
            .take(limit)
            .collect();
        if !urls.is_empty() {
            return urls;
        }
    }
    Vec::new()
}

/// Pure extraction step, separated from fetching so it can be tested on
/// fixture HTML.
pub fn extract_from_html(url: &str, html: &str) -> ProductData {
    let doc = Html::parse_document(html);

    let rating = select_text(&doc, RATING_SELECTORS).and_then(|t| leading_decimal(&t));
    let review_count =
        select_text(&doc, REVIEW_COUNT_SELECTORS).and_then(|t| leading_number(&t));
    let description = select_text(&doc, DESCRIPTION_SELECTORS)
        .map(|d| truncate_with_ellipsis(&d, MAX_DESCRIPTION_CHARS));
    let brand = select_text(&doc, BRAND_SELECTORS)
        .map(|b| b.trim_start_matches("Visit the ").trim_end_matches(" Store").to_string());

    ProductData {
        url: url.to_string(),
        title: select_text(&doc, TITLE_SELECTORS),
        price: select_text(&doc, PRICE_SELECTORS),
        rating,
        review_count,
        features: select_all_text(&doc, FEATURE_SELECTORS, MAX_FEATURES),
        description,
        availability: select_text(&doc, AVAILABILITY_SELECTORS),
        brand,
        category: select_all_text(&doc, CATEGORY_SELECTORS, 1).into_iter().next(),
        images: select_image_urls(&doc, IMAGE_SELECTORS, MAX_IMAGES),
    }
}

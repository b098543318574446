pub mod scrape;
pub mod search;

pub use scrape::{PageScraper, ProductData};
pub use search::{extract_product_urls, is_product_url, SearchHit, SearchResponse, TavilyClient};

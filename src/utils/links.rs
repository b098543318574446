use url::Url;

/// Find the first HTTP(S) URL embedded in free text.
///
/// Queries like `"https://www.amazon.com/dp/B0D1XD1ZV3"` or
/// `"scrape https://example.com/product please"` both resolve to the URL.
pub fn first_url(text: &str) -> Option<Url> {
    text.split_whitespace()
        .map(strip_wrapping)
        .find_map(try_parse_http)
}

/// True when the text contains at least one HTTP(S) URL.
pub fn contains_url(text: &str) -> bool {
    first_url(text).is_some()
}

fn strip_wrapping(token: &str) -> &str {
    let token = token
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(token);
    let token = token
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(token);
    token.trim_end_matches(['.', ',', ';', '!', '?'])
}

fn try_parse_http(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

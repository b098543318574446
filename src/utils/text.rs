#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
/// Scraped page text arrives full of layout whitespace.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the first run of digits from text, ignoring thousands separators.
/// Used for review counts like "1,234 ratings".
#[must_use]
pub fn leading_number(s: &str) -> Option<u64> {
    let cleaned: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    cleaned.parse().ok()
}

/// Extract the first decimal number from text, e.g. "4.2 out of 5" -> 4.2.
#[must_use]
pub fn leading_decimal(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let number: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().ok()
}

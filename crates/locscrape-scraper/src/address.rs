//! Free-text address splitting.
//!
//! Store-locator result items usually render the address as one
//! comma-separated string: `street, city, region postal[, country]`.
//! [`parse_address`] splits that into fields without ever failing; missing
//! segments become empty strings.

/// Structured fields of one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// Split a comma-separated address into its fields.
///
/// The third segment holds the region followed by the postal code
/// (`"ON M5V 2T6"`); with fewer than two whitespace tokens the whole segment
/// is taken as the region. When no fourth segment is present, `default_country`
/// fills the country.
#[must_use]
pub fn parse_address(full: &str, default_country: &str) -> ParsedAddress {
    let segments: Vec<&str> = full.split(',').map(str::trim).collect();
    let segment = |idx: usize| segments.get(idx).copied().unwrap_or_default().to_string();

    let (region, postal_code) = segments
        .get(2)
        .map(|s| split_region_postal(s))
        .unwrap_or_default();

    let country = match segments.get(3) {
        Some(country) => (*country).to_string(),
        None => default_country.to_string(),
    };

    ParsedAddress {
        street: segment(0),
        city: segment(1),
        region,
        postal_code,
        country,
    }
}

fn split_region_postal(segment: &str) -> (String, String) {
    let mut tokens = segment.split_whitespace();
    match (tokens.next(), tokens.clone().next()) {
        (Some(region), Some(_)) => (region.to_string(), tokens.collect::<Vec<_>>().join(" ")),
        _ => (segment.to_string(), String::new()),
    }
}

/// Join component fields into the display form `street, city, region postal, country`.
///
/// Empty region/postal parts are dropped from the third segment so no stray
/// spaces remain.
#[must_use]
pub fn compose_address(parts: &ParsedAddress) -> String {
    let region_postal = [parts.region.as_str(), parts.postal_code.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{}, {}, {}, {}",
        parts.street, parts.city, region_postal, parts.country
    )
}

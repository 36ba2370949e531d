//! Domain types for store locator extraction.

use std::time::Duration;

use locscrape_core::AppConfig;
use serde::{Deserialize, Serialize};

/// One store listing read from a locator results page.
///
/// Serde names match the CSV header. Aliases accept files written by the
/// older per-site scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(rename = "Name")]
    pub name: String,
    /// Full address as displayed.
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Street", default)]
    pub street: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "Region", alias = "Province_State", default)]
    pub region: String,
    #[serde(rename = "PostalCode", alias = "Postal_Code", default)]
    pub postal_code: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    /// Search term whose results first contained this listing.
    #[serde(rename = "SearchTerm", alias = "Search_Zip", default)]
    pub search_term: String,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
}

impl LocationRecord {
    /// Deduplication key: the trimmed name, uppercased.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.name.trim().to_uppercase()
    }
}

/// Timeouts for one search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    /// Wait for the search form and for the results container.
    pub form_timeout: Duration,
    /// Fixed pause after submitting before looking at the page.
    pub results_delay: Duration,
    /// Wait for the zero-results alert.
    pub alert_timeout: Duration,
}

impl From<&AppConfig> for ExtractionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            form_timeout: config.form_timeout(),
            results_delay: config.results_delay(),
            alert_timeout: config.alert_timeout(),
        }
    }
}

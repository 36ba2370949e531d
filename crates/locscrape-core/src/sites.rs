//! The table of supported store-locator sites.
//!
//! Each site is plain data: where its search page lives, which country's
//! postal prefixes drive the sweep, and the element IDs/classes the locator
//! markup uses. The table is assembled once at startup from the built-in
//! defaults plus an optional YAML overrides file and is read-only afterwards.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const CANADA_POSTAL_PREFIXES: &[&str] = &[
    "H7N", // Montreal/Laval, QC
    "M5V", // Toronto, ON
    "K1A", // Ottawa, ON
    "T2P", // Calgary, AB
    "V6B", // Vancouver, BC
    "R3C", // Winnipeg, MB
    "S7K", // Saskatoon, SK
    "B3H", // Halifax, NS
    "A1A", // St. John's, NL
    "Y1A", // Whitehorse, YT
];

const USA_ZIP_PREFIXES: &[&str] = &[
    "10001", // New York, NY
    "90210", // Beverly Hills, CA
    "60601", // Chicago, IL
    "77001", // Houston, TX
    "33101", // Miami, FL
    "02101", // Boston, MA
    "98101", // Seattle, WA
    "30301", // Atlanta, GA
    "80201", // Denver, CO
    "85001", // Phoenix, AZ
];

/// Supported target sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    GmCollin,
    YkCanada,
}

impl SiteId {
    /// Every supported site, in default run order.
    pub const ALL: [SiteId; 2] = [SiteId::GmCollin, SiteId::YkCanada];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SiteId::GmCollin => "gmcollin",
            SiteId::YkCanada => "ykcanada",
        }
    }

    /// Identifiers accepted on the command line and in the sites file.
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            SiteId::GmCollin => &["gmcollin", "gmcollin.ca", "www.gmcollin.ca"],
            SiteId::YkCanada => &["ykcanada", "ykcanada.com", "www.ykcanada.com", "yk"],
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteId {
    type Err = ConfigError;

    /// Exact, case-insensitive alias match. Partial identifiers are rejected.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        SiteId::ALL
            .into_iter()
            .find(|id| id.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| ConfigError::UnknownSite(raw.trim().to_string()))
    }
}

/// Locale of a site's listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Canada,
    Usa,
}

impl Country {
    /// Country written into records whose address text omits one.
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            Country::Canada => "Canada",
            Country::Usa => "USA",
        }
    }

    /// Coarse postal-code prefixes spread across the country's population centres.
    #[must_use]
    pub fn postal_prefixes(self) -> &'static [&'static str] {
        match self {
            Country::Canada => CANADA_POSTAL_PREFIXES,
            Country::Usa => USA_ZIP_PREFIXES,
        }
    }
}

/// One way of reading a result item's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressSource {
    /// Separate elements per field. Accepted only when street and city are present.
    Components {
        street: String,
        city: String,
        region: String,
        postal: String,
        country: String,
    },
    /// A single element holding the comma-separated address.
    FullText(String),
}

/// Element IDs and CSS selectors of a store-locator page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorSelectors {
    pub search_input_id: String,
    pub search_button_id: String,
    pub limit_select_id: String,
    pub results_container: String,
    pub item: String,
    pub name: String,
    /// Tried in order; the first source yielding an address wins.
    pub address_sources: Vec<AddressSource>,
}

impl Default for LocatorSelectors {
    fn default() -> Self {
        Self {
            search_input_id: "address_search".to_string(),
            search_button_id: "submitBtn".to_string(),
            limit_select_id: "limit".to_string(),
            results_container: ".addresses".to_string(),
            item: ".address".to_string(),
            name: ".name".to_string(),
            address_sources: vec![
                AddressSource::Components {
                    street: ".address".to_string(),
                    city: ".city".to_string(),
                    region: ".prov_state".to_string(),
                    postal: ".postal_zip".to_string(),
                    country: ".country".to_string(),
                },
                AddressSource::FullText(".address".to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub id: SiteId,
    pub display_name: String,
    /// File name (without extension) of the site's CSV output.
    pub output_stem: String,
    pub search_url: String,
    pub country: Country,
    pub search_terms: Vec<String>,
    pub selectors: LocatorSelectors,
}

impl SiteConfig {
    /// Built-in configuration for `id`.
    #[must_use]
    pub fn builtin(id: SiteId) -> Self {
        let (display_name, output_stem, search_url) = match id {
            SiteId::GmCollin => (
                "GM Collin",
                "gmcollin_spas_ca",
                "https://www.gmcollin.ca/apps/store-locator/",
            ),
            SiteId::YkCanada => (
                "YK Canada",
                "ykcanada_stores",
                "https://ykcanada.com/apps/store-locator/",
            ),
        };
        let country = Country::Canada;

        Self {
            id,
            display_name: display_name.to_string(),
            output_stem: output_stem.to_string(),
            search_url: search_url.to_string(),
            country,
            search_terms: default_terms(country),
            selectors: LocatorSelectors::default(),
        }
    }

    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!("{}.csv", self.output_stem)
    }
}

fn default_terms(country: Country) -> Vec<String> {
    country
        .postal_prefixes()
        .iter()
        .map(|p| (*p).to_string())
        .collect()
}

/// Immutable table of every supported site.
#[derive(Debug, Clone)]
pub struct SiteTable {
    sites: Vec<SiteConfig>,
}

impl SiteTable {
    /// The built-in table with no overrides applied.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            sites: SiteId::ALL.into_iter().map(SiteConfig::builtin).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: SiteId) -> Option<&SiteConfig> {
        self.sites.iter().find(|site| site.id == id)
    }

    /// All sites in default run order.
    #[must_use]
    pub fn all(&self) -> &[SiteConfig] {
        &self.sites
    }
}

/// Per-site overrides read from the sites YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteOverride {
    pub id: String,
    pub search_url: Option<String>,
    pub country: Option<Country>,
    pub search_terms: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteOverride>,
}

/// Assemble the site table, applying the overrides file when one is given.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, names an
/// unknown site, or fails validation.
pub fn load_site_table(path: Option<&Path>) -> Result<SiteTable, ConfigError> {
    let table = SiteTable::builtin();
    let Some(path) = path else {
        return Ok(table);
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let sites_file: SitesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SitesFileParse)?;

    apply_overrides(table, sites_file)
}

fn apply_overrides(mut table: SiteTable, sites_file: SitesFile) -> Result<SiteTable, ConfigError> {
    let mut seen = HashSet::new();

    for entry in sites_file.sites {
        let id: SiteId = entry.id.parse()?;
        if !seen.insert(id) {
            return Err(ConfigError::Validation(format!(
                "site '{id}' is listed more than once"
            )));
        }

        let Some(site) = table.sites.iter_mut().find(|s| s.id == id) else {
            return Err(ConfigError::UnknownSite(entry.id));
        };

        if let Some(url) = entry.search_url {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "site '{id}' has invalid search_url \"{url}\""
                )));
            }
            site.search_url = url.to_string();
        }

        if let Some(country) = entry.country {
            site.country = country;
            site.search_terms = default_terms(country);
        }

        if let Some(terms) = entry.search_terms {
            let terms: Vec<String> = terms.iter().map(|t| t.trim().to_string()).collect();
            if terms.is_empty() || terms.iter().any(String::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "site '{id}' must list at least one non-empty search term"
                )));
            }
            site.search_terms = terms;
        }
    }

    Ok(table)
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;

//! Reading name and address fields out of one result item.

use locscrape_core::{AddressSource, SiteConfig};

use crate::address::{compose_address, parse_address, ParsedAddress};
use crate::browser::{Browser, BrowserError, Selector};

use super::types::LocationRecord;

pub(super) struct Listing {
    name: String,
    address: String,
    parts: ParsedAddress,
}

impl Listing {
    pub(super) fn into_record(self, term: &str) -> LocationRecord {
        LocationRecord {
            name: self.name,
            address: self.address,
            street: self.parts.street,
            city: self.parts.city,
            region: self.parts.region,
            postal_code: self.parts.postal_code,
            country: self.parts.country,
            search_term: term.to_string(),
            phone: None,
        }
    }
}

/// `Ok(None)` when the item has no name or none of the address sources match.
pub(super) async fn read_item<B: Browser>(
    browser: &mut B,
    site: &SiteConfig,
    item: &B::Element,
) -> Result<Option<Listing>, BrowserError> {
    let name = child_text(browser, item, &site.selectors.name).await?;
    if name.is_empty() {
        return Ok(None);
    }

    let default_country = site.country.default_label();
    for source in &site.selectors.address_sources {
        if let Some((address, parts)) = read_source(browser, item, source, default_country).await? {
            return Ok(Some(Listing {
                name,
                address,
                parts,
            }));
        }
    }

    Ok(None)
}

async fn read_source<B: Browser>(
    browser: &mut B,
    item: &B::Element,
    source: &AddressSource,
    default_country: &str,
) -> Result<Option<(String, ParsedAddress)>, BrowserError> {
    match source {
        AddressSource::Components {
            street,
            city,
            region,
            postal,
            country,
        } => {
            let street = child_text(browser, item, street).await?;
            let city = child_text(browser, item, city).await?;
            if street.is_empty() || city.is_empty() {
                return Ok(None);
            }

            let mut parts = ParsedAddress {
                street,
                city,
                region: child_text(browser, item, region).await?,
                postal_code: child_text(browser, item, postal).await?,
                country: child_text(browser, item, country).await?,
            };
            if parts.country.is_empty() {
                parts.country = default_country.to_string();
            }
            Ok(Some((compose_address(&parts), parts)))
        }
        AddressSource::FullText(selector) => {
            let text = child_text(browser, item, selector).await?;
            if text.is_empty() {
                return Ok(None);
            }
            let parts = parse_address(&text, default_country);
            Ok(Some((text, parts)))
        }
    }
}

/// Trimmed text of the first descendant matching `css`, or `""`.
async fn child_text<B: Browser>(
    browser: &mut B,
    item: &B::Element,
    css: &str,
) -> Result<String, BrowserError> {
    match browser.find_within(item, &Selector::css(css)).await? {
        Some(element) => Ok(browser.text(&element).await?.trim().to_string()),
        None => Ok(String::new()),
    }
}

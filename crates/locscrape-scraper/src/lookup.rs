//! Phone number lookup through Google Maps search.
//!
//! The listing page is probed with a fixed, ordered list of selectors that
//! have carried the phone number in past layouts; when none of them matches,
//! the visible page text is scanned as a last resort.

use std::time::Duration;

use locscrape_core::AppConfig;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::browser::{Browser, BrowserError, Selector};
use crate::pacing::Pacing;
use crate::phone::{find_phone_in_text, is_valid_phone, normalize_phone};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
const RESULTS_SELECTOR: &str = "[data-result-index]";
const TOP_RESULT_SELECTOR: &str = "[data-result-index='0']";

#[derive(Debug, Clone, Copy)]
enum Probe {
    Css(&'static str),
    XPath(&'static str),
}

impl Probe {
    fn selector(self) -> Selector {
        match self {
            Probe::Css(css) => Selector::css(css),
            Probe::XPath(xpath) => Selector::xpath(xpath),
        }
    }
}

const PHONE_PROBES: &[Probe] = &[
    Probe::Css("button[data-item-id*='phone']"),
    Probe::Css("[data-item-id*='phone'] span"),
    Probe::Css("span[data-phone]"),
    Probe::Css("button[jsaction*='phone']"),
    Probe::Css("[aria-label*='Phone']"),
    Probe::XPath("//span[contains(text(), '+')]"),
    Probe::Css("button[aria-label*='Call']"),
];

/// Waits and pacing for one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSettings {
    /// Wait for the search results list.
    pub results_timeout: Duration,
    /// Wait for the top result to become clickable.
    pub open_timeout: Duration,
    /// Pause after opening the top result.
    pub settle_delay: Duration,
    /// Random pause before opening a result, and between lookups.
    pub pacing: Pacing,
}

impl From<&AppConfig> for LookupSettings {
    fn from(config: &AppConfig) -> Self {
        let (min, max) = config.phone_delay_range();
        Self {
            results_timeout: config.phone_results_timeout(),
            open_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_secs(3),
            pacing: Pacing::new(min, max),
        }
    }
}

/// Map search URL for a business.
#[must_use]
pub fn maps_search_url(name: &str, address: &str) -> String {
    let query = format!("{name} {address}");
    format!(
        "{MAPS_SEARCH_URL}{}",
        utf8_percent_encode(query.trim(), NON_ALPHANUMERIC)
    )
}

/// Look up the phone number of `name` at `address`.
///
/// Every failure degrades to `None`.
pub async fn lookup_phone<B: Browser>(
    browser: &mut B,
    name: &str,
    address: &str,
    settings: &LookupSettings,
) -> Option<String> {
    match try_lookup(browser, name, address, settings).await {
        Ok(phone) => phone,
        Err(e) => {
            tracing::warn!(name, error = %e, "phone lookup failed");
            None
        }
    }
}

async fn try_lookup<B: Browser>(
    browser: &mut B,
    name: &str,
    address: &str,
    settings: &LookupSettings,
) -> Result<Option<String>, BrowserError> {
    browser.goto(&maps_search_url(name, address)).await?;

    if browser
        .wait_for(&Selector::css(RESULTS_SELECTOR), settings.results_timeout)
        .await?
        .is_none()
    {
        tracing::info!(name, "no map results");
        return Ok(None);
    }

    settings.pacing.pause().await;
    open_top_result(browser, settings).await;

    if let Some(phone) = probe_listing(browser).await {
        tracing::info!(name, phone = %phone, "phone found");
        return Ok(Some(phone));
    }

    let phone = find_phone_in_text(&browser.page_text().await?);
    match &phone {
        Some(phone) => tracing::info!(name, phone = %phone, "phone found in page text"),
        None => tracing::info!(name, "no phone on listing"),
    }
    Ok(phone)
}

async fn open_top_result<B: Browser>(browser: &mut B, settings: &LookupSettings) {
    let top = Selector::css(TOP_RESULT_SELECTOR);
    let opened = match browser.wait_for(&top, settings.open_timeout).await {
        Ok(Some(element)) => browser.click(&element).await,
        Ok(None) => Err(BrowserError::MissingElement(top.to_string())),
        Err(e) => Err(e),
    };

    match opened {
        Ok(()) => tokio::time::sleep(settings.settle_delay).await,
        Err(e) => tracing::debug!(error = %e, "could not open top result"),
    }
}

async fn probe_listing<B: Browser>(browser: &mut B) -> Option<String> {
    for probe in PHONE_PROBES {
        let selector = probe.selector();
        match probe_one(browser, &selector).await {
            Ok(Some(phone)) => return Some(phone),
            Ok(None) => {}
            Err(e) => tracing::debug!(selector = %selector, error = %e, "phone probe failed"),
        }
    }
    None
}

async fn probe_one<B: Browser>(
    browser: &mut B,
    selector: &Selector,
) -> Result<Option<String>, BrowserError> {
    for element in browser.find_all(selector).await? {
        let mut candidate = browser.text(&element).await?.trim().to_string();
        if candidate.is_empty() {
            candidate = browser
                .attribute(&element, "aria-label")
                .await?
                .unwrap_or_default();
        }
        if is_valid_phone(&candidate) {
            return Ok(Some(normalize_phone(&candidate)));
        }
    }
    Ok(None)
}

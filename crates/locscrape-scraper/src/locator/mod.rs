//! Store locator extraction.
//!
//! One call to [`extract_locations`] performs a single search on a site's
//! locator page: load the page, fill in the search form, wait for results and
//! read every listed store. Any fault during the pass is logged and turns into
//! an empty result for that term only.

mod fields;
pub mod types;

pub use types::{ExtractionSettings, LocationRecord};

use locscrape_core::SiteConfig;
use serde_json::{json, Value};

use crate::browser::{Browser, BrowserError, Selector};

/// Appends a `100` option to the result-limit select and selects it.
const WIDEN_LIMIT_SCRIPT: &str = r"
var select = document.getElementById(arguments[0]);
if (!select) { return false; }
var option = document.createElement('option');
option.value = '100';
option.text = '100';
select.appendChild(option);
select.value = '100';
select.dispatchEvent(new Event('change', { bubbles: true }));
return true;
";

/// Run one search for `term` and return the listings it produced.
///
/// Never fails: a missing form, an explicit zero-results alert, a missing
/// results container and unexpected browser faults all yield an empty `Vec`.
pub async fn extract_locations<B: Browser>(
    browser: &mut B,
    site: &SiteConfig,
    term: &str,
    settings: &ExtractionSettings,
) -> Vec<LocationRecord> {
    match search_pass(browser, site, term, settings).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(site = %site.id, term, error = %e, "search pass failed");
            Vec::new()
        }
    }
}

async fn search_pass<B: Browser>(
    browser: &mut B,
    site: &SiteConfig,
    term: &str,
    settings: &ExtractionSettings,
) -> Result<Vec<LocationRecord>, BrowserError> {
    let selectors = &site.selectors;

    browser.goto(&site.search_url).await?;

    let input_selector = Selector::id(&selectors.search_input_id);
    let Some(input) = browser
        .wait_for(&input_selector, settings.form_timeout)
        .await?
    else {
        tracing::warn!(
            site = %site.id,
            term,
            selector = %input_selector,
            "search form not found"
        );
        return Ok(Vec::new());
    };

    widen_result_limit(browser, &selectors.limit_select_id).await;

    browser.type_into(&input, term).await?;
    submit(browser, &Selector::id(&selectors.search_button_id)).await?;

    tokio::time::sleep(settings.results_delay).await;

    if let Some(message) = browser.take_alert(settings.alert_timeout).await? {
        tracing::info!(site = %site.id, term, alert = %message, "no results for term");
        return Ok(Vec::new());
    }

    let container = Selector::css(&selectors.results_container);
    if browser
        .wait_for(&container, settings.form_timeout)
        .await?
        .is_none()
    {
        tracing::info!(site = %site.id, term, "results container did not appear");
        return Ok(Vec::new());
    }

    let items = browser.find_all(&Selector::css(&selectors.item)).await?;
    tracing::debug!(site = %site.id, term, items = items.len(), "reading results");

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match fields::read_item(browser, site, item).await {
            Ok(Some(listing)) => records.push(listing.into_record(term)),
            Ok(None) => {
                tracing::debug!(site = %site.id, term, index, "skipping item without name or address");
            }
            Err(e) => {
                tracing::warn!(site = %site.id, term, index, error = %e, "failed to read result item");
            }
        }
    }

    tracing::info!(site = %site.id, term, count = records.len(), "search term done");
    Ok(records)
}

/// Best-effort: a failure only means fewer results per page.
async fn widen_result_limit<B: Browser>(browser: &mut B, select_id: &str) {
    match browser
        .execute(WIDEN_LIMIT_SCRIPT, vec![json!(select_id)])
        .await
    {
        Ok(Value::Bool(true)) => tracing::debug!(select_id, "result limit raised to 100"),
        Ok(_) => tracing::debug!(select_id, "result limit select not present"),
        Err(e) => tracing::debug!(select_id, error = %e, "could not raise result limit"),
    }
}

async fn submit<B: Browser>(browser: &mut B, button: &Selector) -> Result<(), BrowserError> {
    let Some(element) = browser.find_all(button).await?.into_iter().next() else {
        return Err(BrowserError::MissingElement(button.to_string()));
    };

    if let Err(e) = browser.click(&element).await {
        tracing::debug!(error = %e, "direct click failed; clicking via script");
        browser.script_click(&element).await?;
    }
    Ok(())
}

//! Whole-site scrape: sweep every search term, merge, optionally add phones.

use std::collections::HashSet;

use locscrape_core::{AppConfig, SiteConfig};

use crate::browser::{close_quietly, interruptible, Browser, Launcher};
use crate::error::ScraperError;
use crate::locator::{extract_locations, ExtractionSettings, LocationRecord};
use crate::lookup::{lookup_phone, LookupSettings};

/// Everything a site scrape needs besides the site itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSettings {
    pub extraction: ExtractionSettings,
    pub lookup: LookupSettings,
    pub enrich_phones: bool,
    /// Look up at most this many records; the rest keep no phone.
    pub phone_limit: Option<usize>,
}

impl ScrapeSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig, enrich_phones: bool, phone_limit: Option<usize>) -> Self {
        Self {
            extraction: ExtractionSettings::from(config),
            lookup: LookupSettings::from(config),
            enrich_phones,
            phone_limit,
        }
    }
}

/// Outcome of one site scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteScrape {
    pub records: Vec<LocationRecord>,
    /// Records that received a phone number. Zero when enrichment is off.
    pub phones_found: usize,
}

/// Ordered set of listings keyed by [`LocationRecord::dedup_key`].
///
/// The first occurrence of a name wins; later ones are dropped.
#[derive(Debug, Default)]
pub struct UniqueLocations {
    seen: HashSet<String>,
    records: Vec<LocationRecord>,
}

impl UniqueLocations {
    /// Returns `false` when a listing with the same name is already present.
    pub fn insert(&mut self, record: LocationRecord) -> bool {
        if !self.seen.insert(record.dedup_key()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Insert every record, returning how many were new.
    pub fn extend(&mut self, records: impl IntoIterator<Item = LocationRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.insert(record) {
                added += 1;
            }
        }
        added
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<LocationRecord> {
        self.records
    }
}

/// Scrape every search term of `site`, then add phone numbers if enabled.
///
/// Each phase runs in its own browser session, closed before the next phase
/// starts and also when the user interrupts.
///
/// A phone session that cannot be started leaves every record without a
/// phone; the extracted locations are still returned.
///
/// # Errors
///
/// Returns [`ScraperError::Browser`] if the extraction session cannot be
/// started and [`ScraperError::Interrupted`] on Ctrl-C.
pub async fn scrape_site<L: Launcher>(
    launcher: &L,
    site: &SiteConfig,
    settings: &ScrapeSettings,
) -> Result<SiteScrape, ScraperError> {
    let mut browser = launch(launcher).await?;
    let swept = interruptible(sweep_search_terms(&mut browser, site, &settings.extraction)).await;
    close_quietly(&mut browser).await;
    let mut records = swept?;

    tracing::info!(site = %site.id, count = records.len(), "unique locations collected");

    let phones_found = if settings.enrich_phones && !records.is_empty() {
        match enrich_with_phones(launcher, &mut records, &settings.lookup, settings.phone_limit)
            .await
        {
            Ok(found) => found,
            Err(ScraperError::Browser(e)) => {
                tracing::warn!(site = %site.id, error = %e, "phone lookup skipped");
                0
            }
            Err(e) => return Err(e),
        }
    } else {
        0
    };

    Ok(SiteScrape {
        records,
        phones_found,
    })
}

/// Run [`extract_locations`] for each search term and merge the results.
pub async fn sweep_search_terms<B: Browser>(
    browser: &mut B,
    site: &SiteConfig,
    settings: &ExtractionSettings,
) -> Vec<LocationRecord> {
    let mut unique = UniqueLocations::default();
    let total = site.search_terms.len();

    for (idx, term) in site.search_terms.iter().enumerate() {
        tracing::info!(site = %site.id, term = %term, "searching ({}/{total})", idx + 1);
        let found = extract_locations(browser, site, term, settings).await;
        let returned = found.len();
        let added = unique.extend(found);
        tracing::debug!(
            site = %site.id,
            term = %term,
            returned,
            added,
            total = unique.len(),
            "merged results"
        );
    }

    unique.into_records()
}

/// Open a fresh session and fill in `phone` on up to `limit` records.
///
/// Returns how many records received a number.
///
/// # Errors
///
/// Returns [`ScraperError::Browser`] if the session cannot be started and
/// [`ScraperError::Interrupted`] on Ctrl-C.
pub async fn enrich_with_phones<L: Launcher>(
    launcher: &L,
    records: &mut [LocationRecord],
    settings: &LookupSettings,
    limit: Option<usize>,
) -> Result<usize, ScraperError> {
    let mut browser = launch(launcher).await?;
    let outcome = interruptible(lookup_phones(&mut browser, records, settings, limit)).await;
    close_quietly(&mut browser).await;
    outcome
}

/// Start a session; Ctrl-C while connecting counts as an interrupt.
async fn launch<L: Launcher>(launcher: &L) -> Result<L::Browser, ScraperError> {
    Ok(interruptible(launcher.launch()).await??)
}

/// Look up phones in an already open session.
pub async fn lookup_phones<B: Browser>(
    browser: &mut B,
    records: &mut [LocationRecord],
    settings: &LookupSettings,
    limit: Option<usize>,
) -> usize {
    let take = limit.map_or(records.len(), |n| n.min(records.len()));
    let mut found = 0;

    for (idx, record) in records.iter_mut().take(take).enumerate() {
        if idx > 0 {
            settings.pacing.pause().await;
        }
        tracing::info!(name = %record.name, "looking up phone ({}/{take})", idx + 1);
        record.phone = lookup_phone(browser, &record.name, &record.address, settings).await;
        if record.phone.is_some() {
            found += 1;
        }
    }

    tracing::info!(found, looked_up = take, "phone lookup finished");
    found
}

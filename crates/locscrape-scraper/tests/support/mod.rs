//! Scripted in-memory browser for driving extraction without a WebDriver.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use locscrape_core::{SiteConfig, SiteId};
use locscrape_scraper::{
    maps_search_url, Browser, BrowserError, ExtractionSettings, Launcher, LookupSettings, Pacing,
    Selector,
};
use serde_json::Value;

const MAPS_PREFIX: &str = "https://www.google.com/maps/search/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    SearchInput,
    SearchButton,
    Container,
    Item(usize),
    Field { item: usize, css: String },
    MapsResult,
    Probe { text: String, aria_label: Option<String> },
}

/// One result item: CSS selector of a child element mapped to its text.
#[derive(Debug, Clone, Default)]
pub struct FakeItem {
    fields: HashMap<String, String>,
}

impl FakeItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, css: &str, text: &str) -> Self {
        self.fields.insert(css.to_string(), text.to_string());
        self
    }

    /// Item rendered with separate address components.
    pub fn components(name: &str, street: &str, city: &str, region: &str, postal: &str) -> Self {
        Self::new()
            .with(".name", name)
            .with(".address", street)
            .with(".city", city)
            .with(".prov_state", region)
            .with(".postal_zip", postal)
    }
}

#[derive(Debug, Clone)]
pub enum SearchResponse {
    Alert(String),
    Items(Vec<FakeItem>),
    NoContainer,
}

/// What the map listing page shows for one business.
#[derive(Debug, Clone, Default)]
pub struct MapsListing {
    /// Selector (as displayed) mapped to element text and aria-label.
    pub probes: HashMap<String, (String, Option<String>)>,
    pub body: String,
}

impl MapsListing {
    pub fn probe(mut self, selector: &str, text: &str, aria_label: Option<&str>) -> Self {
        self.probes.insert(
            selector.to_string(),
            (text.to_string(), aria_label.map(str::to_string)),
        );
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

/// Scripted behaviour shared by every session a [`FakeLauncher`] opens.
#[derive(Debug, Clone, Default)]
pub struct FakeWeb {
    pub form_missing: bool,
    pub click_fails: bool,
    /// Terms with no entry return an empty results container.
    pub responses: HashMap<String, SearchResponse>,
    /// Typing these terms fails as if the element went stale.
    pub failing_terms: HashSet<String>,
    /// Business name mapped to its map listing.
    pub listings: Vec<(String, MapsListing)>,
}

impl FakeWeb {
    pub fn respond(mut self, term: &str, response: SearchResponse) -> Self {
        self.responses.insert(term.to_string(), response);
        self
    }

    pub fn listing(mut self, name: &str, listing: MapsListing) -> Self {
        self.listings.push((name.to_string(), listing));
        self
    }
}

/// Everything the fake observed, shared across sessions.
#[derive(Debug, Default)]
pub struct Journal {
    pub launches: usize,
    pub closes: usize,
    pub visited: Vec<String>,
    pub typed: Vec<String>,
    pub script_clicks: usize,
    pub script_args: Vec<Value>,
}

pub struct FakeBrowser {
    web: Arc<FakeWeb>,
    journal: Arc<Mutex<Journal>>,
    typed: Option<String>,
    results: Option<SearchResponse>,
    alert: Option<String>,
    listing: Option<MapsListing>,
}

impl FakeBrowser {
    pub fn new(web: FakeWeb) -> (Self, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        (Self::with_journal(Arc::new(web), Arc::clone(&journal)), journal)
    }

    fn with_journal(web: Arc<FakeWeb>, journal: Arc<Mutex<Journal>>) -> Self {
        Self {
            web,
            journal,
            typed: None,
            results: None,
            alert: None,
            listing: None,
        }
    }

    fn items(&self) -> &[FakeItem] {
        match &self.results {
            Some(SearchResponse::Items(items)) => items,
            _ => &[],
        }
    }

    fn submit(&mut self) {
        let term = self.typed.clone().unwrap_or_default();
        let response = self
            .web
            .responses
            .get(&term)
            .cloned()
            .unwrap_or(SearchResponse::Items(Vec::new()));
        if let SearchResponse::Alert(message) = &response {
            self.alert = Some(message.clone());
        }
        self.results = Some(response);
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.journal.lock().unwrap().visited.push(url.to_string());
        self.typed = None;
        self.results = None;
        self.alert = None;
        self.listing = if url.starts_with(MAPS_PREFIX) {
            self.web
                .listings
                .iter()
                .find(|(name, _)| url.starts_with(&maps_search_url(name, "")))
                .map(|(_, listing)| listing.clone())
        } else {
            None
        };
        Ok(())
    }

    async fn wait_for(
        &mut self,
        selector: &Selector,
        _timeout: Duration,
    ) -> Result<Option<FakeElement>, BrowserError> {
        let found = match selector {
            Selector::Id(_) if !self.web.form_missing => Some(FakeElement::SearchInput),
            Selector::Css(css) if css.starts_with("[data-result-index") => {
                self.listing.as_ref().map(|_| FakeElement::MapsResult)
            }
            Selector::Css(_) => match &self.results {
                Some(SearchResponse::Items(_)) => Some(FakeElement::Container),
                _ => None,
            },
            _ => None,
        };
        Ok(found)
    }

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<FakeElement>, BrowserError> {
        if let Some(listing) = &self.listing {
            return Ok(listing
                .probes
                .get(&selector.to_string())
                .map(|(text, aria_label)| {
                    vec![FakeElement::Probe {
                        text: text.clone(),
                        aria_label: aria_label.clone(),
                    }]
                })
                .unwrap_or_default());
        }
        Ok(match selector {
            Selector::Id(_) => vec![FakeElement::SearchButton],
            _ => (0..self.items().len()).map(FakeElement::Item).collect(),
        })
    }

    async fn find_within(
        &mut self,
        parent: &FakeElement,
        selector: &Selector,
    ) -> Result<Option<FakeElement>, BrowserError> {
        let (FakeElement::Item(item), Selector::Css(css)) = (parent, selector) else {
            return Ok(None);
        };
        let present = self
            .items()
            .get(*item)
            .is_some_and(|i| i.fields.contains_key(css));
        Ok(present.then(|| FakeElement::Field {
            item: *item,
            css: css.clone(),
        }))
    }

    async fn click(&mut self, element: &FakeElement) -> Result<(), BrowserError> {
        if *element == FakeElement::SearchButton {
            if self.web.click_fails {
                return Err(BrowserError::Unexpected(
                    "element click intercepted".to_string(),
                ));
            }
            self.submit();
        }
        Ok(())
    }

    async fn script_click(&mut self, element: &FakeElement) -> Result<(), BrowserError> {
        self.journal.lock().unwrap().script_clicks += 1;
        if *element == FakeElement::SearchButton {
            self.submit();
        }
        Ok(())
    }

    async fn type_into(&mut self, _element: &FakeElement, text: &str) -> Result<(), BrowserError> {
        if self.web.failing_terms.contains(text) {
            return Err(BrowserError::Unexpected(
                "stale element reference".to_string(),
            ));
        }
        self.journal.lock().unwrap().typed.push(text.to_string());
        self.typed = Some(text.to_string());
        Ok(())
    }

    async fn text(&mut self, element: &FakeElement) -> Result<String, BrowserError> {
        Ok(match element {
            FakeElement::Field { item, css } => self
                .items()
                .get(*item)
                .and_then(|i| i.fields.get(css))
                .cloned()
                .unwrap_or_default(),
            FakeElement::Probe { text, .. } => text.clone(),
            _ => String::new(),
        })
    }

    async fn attribute(
        &mut self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(match element {
            FakeElement::Probe { aria_label, .. } if name == "aria-label" => aria_label.clone(),
            _ => None,
        })
    }

    async fn execute(&mut self, _script: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        self.journal.lock().unwrap().script_args.extend(args);
        Ok(Value::Bool(true))
    }

    async fn take_alert(&mut self, _timeout: Duration) -> Result<Option<String>, BrowserError> {
        Ok(self.alert.take())
    }

    async fn page_text(&mut self) -> Result<String, BrowserError> {
        Ok(self
            .listing
            .as_ref()
            .map(|l| l.body.clone())
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.journal.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub struct FakeLauncher {
    web: Arc<FakeWeb>,
    pub journal: Arc<Mutex<Journal>>,
    /// Sessions allowed before every further launch is refused.
    session_budget: Option<usize>,
}

impl FakeLauncher {
    pub fn new(web: FakeWeb) -> Self {
        Self {
            web: Arc::new(web),
            journal: Arc::new(Mutex::new(Journal::default())),
            session_budget: None,
        }
    }

    /// A launcher whose WebDriver server never answers.
    pub fn unreachable() -> Self {
        Self::new(FakeWeb::default()).refuse_after(0)
    }

    /// Start `sessions` sessions, then refuse the connection.
    pub fn refuse_after(mut self, sessions: usize) -> Self {
        self.session_budget = Some(sessions);
        self
    }

    pub fn launches(&self) -> usize {
        self.journal.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.journal.lock().unwrap().closes
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    type Browser = FakeBrowser;

    async fn launch(&self) -> Result<FakeBrowser, BrowserError> {
        let mut journal = self.journal.lock().unwrap();
        if self.session_budget.is_some_and(|budget| journal.launches >= budget) {
            return Err(BrowserError::Unexpected(
                "connection refused".to_string(),
            ));
        }
        journal.launches += 1;
        drop(journal);
        Ok(FakeBrowser::with_journal(
            Arc::clone(&self.web),
            Arc::clone(&self.journal),
        ))
    }
}

/// GM Collin with the given search terms.
pub fn site_with_terms(terms: &[&str]) -> SiteConfig {
    let mut site = SiteConfig::builtin(SiteId::GmCollin);
    site.search_terms = terms.iter().map(|t| (*t).to_string()).collect();
    site
}

pub fn instant_extraction() -> ExtractionSettings {
    ExtractionSettings {
        form_timeout: Duration::ZERO,
        results_delay: Duration::ZERO,
        alert_timeout: Duration::ZERO,
    }
}

pub fn instant_lookup() -> LookupSettings {
    LookupSettings {
        results_timeout: Duration::ZERO,
        open_timeout: Duration::ZERO,
        settle_delay: Duration::ZERO,
        pacing: Pacing::none(),
    }
}

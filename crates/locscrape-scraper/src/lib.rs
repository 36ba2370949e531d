pub mod address;
pub mod browser;
pub mod error;
pub mod locator;
pub mod lookup;
pub mod pacing;
pub mod phone;
pub mod site;
pub mod webdriver;

pub use address::{compose_address, parse_address, ParsedAddress};
pub use browser::{close_quietly, interruptible, Browser, BrowserError, Launcher, Selector};
pub use error::ScraperError;
pub use locator::{extract_locations, ExtractionSettings, LocationRecord};
pub use lookup::{lookup_phone, maps_search_url, LookupSettings};
pub use pacing::Pacing;
pub use phone::{find_phone_in_text, is_valid_phone, normalize_phone};
pub use site::{
    enrich_with_phones, lookup_phones, scrape_site, sweep_search_terms, ScrapeSettings,
    SiteScrape, UniqueLocations,
};
pub use webdriver::{WebDriverBrowser, WebDriverLauncher};

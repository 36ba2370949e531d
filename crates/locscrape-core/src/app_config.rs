use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings shared by the CLI and the scraping pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: String,
    pub output_dir: PathBuf,
    pub sites_path: Option<PathBuf>,
    pub form_timeout_secs: u64,
    pub results_delay_secs: u64,
    pub alert_timeout_secs: u64,
    pub inter_site_delay_secs: u64,
    pub phone_results_timeout_secs: u64,
    pub phone_delay_min_secs: u64,
    pub phone_delay_max_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn form_timeout(&self) -> Duration {
        Duration::from_secs(self.form_timeout_secs)
    }

    #[must_use]
    pub fn results_delay(&self) -> Duration {
        Duration::from_secs(self.results_delay_secs)
    }

    #[must_use]
    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_secs)
    }

    #[must_use]
    pub fn inter_site_delay(&self) -> Duration {
        Duration::from_secs(self.inter_site_delay_secs)
    }

    #[must_use]
    pub fn phone_results_timeout(&self) -> Duration {
        Duration::from_secs(self.phone_results_timeout_secs)
    }

    /// Inclusive bounds of the random pause applied around each phone lookup.
    #[must_use]
    pub fn phone_delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.phone_delay_min_secs),
            Duration::from_secs(self.phone_delay_max_secs),
        )
    }
}

//! [`Browser`] backed by a W3C WebDriver server through `fantoccini`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use locscrape_core::AppConfig;
use serde_json::{json, Map, Value};

use crate::browser::{Browser, BrowserError, Launcher, Selector};

const ALERT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const HIDE_WEBDRIVER_FLAG: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined});";

/// Opens Chrome sessions on a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
    headless: bool,
    user_agent: String,
}

impl WebDriverLauncher {
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>, headless: bool, user_agent: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            user_agent: user_agent.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.webdriver_url, config.headless, &config.user_agent)
    }

    /// Force a visible browser window regardless of configuration.
    #[must_use]
    pub fn headful(mut self) -> Self {
        self.headless = false;
        self
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--window-size=1920,1080".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", self.user_agent),
        ];
        if self.headless {
            args.insert(0, "--headless=new".to_string());
        }

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "excludeSwitches": ["enable-automation"],
            }),
        );
        caps
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    type Browser = WebDriverBrowser;

    async fn launch(&self) -> Result<WebDriverBrowser, BrowserError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        let client = builder.connect(&self.webdriver_url).await?;
        tracing::debug!(
            webdriver_url = %self.webdriver_url,
            headless = self.headless,
            "browser session started"
        );

        if let Err(e) = client.execute(HIDE_WEBDRIVER_FLAG, vec![]).await {
            tracing::debug!(error = %e, "could not mask navigator.webdriver");
        }

        Ok(WebDriverBrowser { client })
    }
}

/// One live WebDriver session.
pub struct WebDriverBrowser {
    client: Client,
}

fn locator(selector: &Selector) -> Locator<'_> {
    match selector {
        Selector::Id(id) => Locator::Id(id),
        Selector::Css(css) => Locator::Css(css),
        Selector::XPath(xpath) => Locator::XPath(xpath),
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_for(
        &mut self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Option<Element>, BrowserError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(locator(selector))
            .await
        {
            Ok(element) => Ok(Some(element)),
            Err(CmdError::WaitTimeout) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<Element>, BrowserError> {
        Ok(self.client.find_all(locator(selector)).await?)
    }

    async fn find_within(
        &mut self,
        parent: &Element,
        selector: &Selector,
    ) -> Result<Option<Element>, BrowserError> {
        // find_all reports "no match" as an empty list rather than an error.
        let mut found = parent.find_all(locator(selector)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    async fn click(&mut self, element: &Element) -> Result<(), BrowserError> {
        element.click().await?;
        Ok(())
    }

    async fn script_click(&mut self, element: &Element) -> Result<(), BrowserError> {
        let arg = serde_json::to_value(element)?;
        self.client
            .execute("arguments[0].click();", vec![arg])
            .await?;
        Ok(())
    }

    async fn type_into(&mut self, element: &Element, text: &str) -> Result<(), BrowserError> {
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn text(&mut self, element: &Element) -> Result<String, BrowserError> {
        Ok(element.text().await?)
    }

    async fn attribute(
        &mut self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(element.attr(name).await?)
    }

    async fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn take_alert(&mut self, timeout: Duration) -> Result<Option<String>, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.get_alert_text().await {
                Ok(text) => {
                    self.client.accept_alert().await?;
                    return Ok(Some(text));
                }
                // "no such alert" is the expected answer while polling.
                Err(_) if Instant::now() < deadline => {
                    tokio::time::sleep(ALERT_POLL_INTERVAL).await;
                }
                Err(_) => return Ok(None),
            }
        }
    }

    async fn page_text(&mut self) -> Result<String, BrowserError> {
        let body = self.client.find(Locator::Css("body")).await?;
        Ok(body.text().await?)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.client.clone().close().await?;
        tracing::debug!("browser session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome_args(launcher: &WebDriverLauncher) -> Vec<String> {
        let caps = launcher.capabilities();
        caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn headless_launcher_requests_headless_chrome() {
        let launcher = WebDriverLauncher::new("http://localhost:4444", true, "UA/1.0");
        let args = chrome_args(&launcher);
        assert_eq!(args[0], "--headless=new");
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.contains(&"--user-agent=UA/1.0".to_string()));
    }

    #[test]
    fn headful_drops_headless_flag() {
        let launcher = WebDriverLauncher::new("http://localhost:4444", true, "UA/1.0").headful();
        let args = chrome_args(&launcher);
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
    }

    #[test]
    fn capabilities_exclude_automation_switch() {
        let launcher = WebDriverLauncher::new("http://localhost:4444", false, "UA/1.0");
        let caps = launcher.capabilities();
        assert_eq!(caps["browserName"], "chrome");
        assert_eq!(
            caps["goog:chromeOptions"]["excludeSwitches"][0],
            "enable-automation"
        );
    }
}

//! The browser automation boundary.
//!
//! Extraction code is written against [`Browser`] so it can be driven by the
//! WebDriver implementation in [`crate::webdriver`] or by a scripted fake in
//! tests. A session is opened through a [`Launcher`] and must be closed by
//! the code that opened it on every exit path.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

/// How to locate an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Id(String),
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css(css.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Selector::XPath(xpath.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Css(css) => f.write_str(css),
            Selector::XPath(xpath) => write!(f, "xpath:{xpath}"),
        }
    }
}

/// Errors raised by a browser session.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to start WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("could not encode script argument: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("{0}")]
    Unexpected(String),
}

/// One open browser session.
///
/// Lookups that can legitimately come up empty return `Ok(None)` or an empty
/// `Vec`; `Err` is reserved for a session that misbehaved.
#[async_trait]
pub trait Browser: Send {
    type Element: Send + Sync;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Poll until `selector` matches or `timeout` elapses.
    async fn wait_for(
        &mut self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, BrowserError>;

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<Self::Element>, BrowserError>;

    /// First descendant of `parent` matching `selector`.
    async fn find_within(
        &mut self,
        parent: &Self::Element,
        selector: &Selector,
    ) -> Result<Option<Self::Element>, BrowserError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Click through an inline script, bypassing overlay and visibility checks.
    async fn script_click(&mut self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Clear the field, then type `text` into it.
    async fn type_into(&mut self, element: &Self::Element, text: &str)
        -> Result<(), BrowserError>;

    async fn text(&mut self, element: &Self::Element) -> Result<String, BrowserError>;

    async fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn execute(
        &mut self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BrowserError>;

    /// Wait up to `timeout` for a modal alert; accept it and return its text.
    async fn take_alert(&mut self, timeout: Duration) -> Result<Option<String>, BrowserError>;

    /// Visible text of the whole page body.
    async fn page_text(&mut self) -> Result<String, BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Opens browser sessions.
#[async_trait]
pub trait Launcher: Send + Sync {
    type Browser: Browser;

    async fn launch(&self) -> Result<Self::Browser, BrowserError>;
}

/// Run `work` unless the user interrupts first.
///
/// On Ctrl-C the work future is dropped, releasing its borrow of the session
/// so the caller can close it before propagating [`ScraperError::Interrupted`].
///
/// # Errors
///
/// Returns [`ScraperError::Interrupted`] when Ctrl-C arrives before `work` completes.
pub async fn interruptible<F: Future>(work: F) -> Result<F::Output, ScraperError> {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available: never fire.
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        output = work => Ok(output),
        () = interrupt => {
            tracing::warn!("interrupt received; releasing browser session");
            Err(ScraperError::Interrupted)
        }
    }
}

/// Close `browser`, logging rather than propagating a failure.
pub async fn close_quietly<B: Browser>(browser: &mut B) {
    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}

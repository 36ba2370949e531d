use thiserror::Error;

use crate::browser::BrowserError;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("interrupted by user")]
    Interrupted,
}

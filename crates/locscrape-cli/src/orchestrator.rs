//! Sequential multi-site runs and the end-of-run summary.
//!
//! A site that errors or panics becomes a failed [`SiteResult`]; the next site
//! still runs. Only a user interrupt stops the loop early.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::FutureExt;
use locscrape_core::{SiteConfig, SiteId};
use locscrape_scraper::{interruptible, ScraperError};

/// What a successful site run hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SiteReport {
    pub locations: usize,
    /// `Some` only when phone enrichment ran.
    pub phones_found: Option<usize>,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SiteStatus {
    Success,
    Failure,
}

/// Outcome of one site, fixed once the site finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SiteResult {
    pub site: SiteId,
    pub status: SiteStatus,
    pub error: Option<String>,
    pub duration: Duration,
    pub locations: usize,
    pub phones_found: Option<usize>,
    pub output_path: Option<PathBuf>,
}

impl SiteResult {
    fn success(site: SiteId, duration: Duration, report: SiteReport) -> Self {
        Self {
            site,
            status: SiteStatus::Success,
            error: None,
            duration,
            locations: report.locations,
            phones_found: report.phones_found,
            output_path: Some(report.output_path),
        }
    }

    fn failure(site: SiteId, duration: Duration, error: String) -> Self {
        Self {
            site,
            status: SiteStatus::Failure,
            error: Some(error),
            duration,
            locations: 0,
            phones_found: None,
            output_path: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RunSummary {
    pub results: Vec<SiteResult>,
    /// Sites that were requested.
    pub planned: usize,
    pub interrupted: bool,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn successes(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == SiteStatus::Success)
            .count()
    }

    pub fn failures(&self) -> usize {
        self.results.len() - self.successes()
    }

    pub fn total_locations(&self) -> usize {
        self.results.iter().map(|r| r.locations).sum()
    }
}

/// Run `process_site` for each site in order, pausing `inter_site_delay`
/// between sites.
///
/// `process_site` receives `(ctx, site)`. Errors and panics are recorded as
/// failures; a [`ScraperError::Interrupted`] ends the run without recording the
/// interrupted site.
pub(crate) async fn run_sites<C, F>(
    ctx: &C,
    sites: &[SiteConfig],
    inter_site_delay: Duration,
    process_site: F,
) -> RunSummary
where
    F: for<'a> Fn(
        &'a C,
        &'a SiteConfig,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<SiteReport>> + 'a>>,
{
    let started = Instant::now();
    let mut results = Vec::with_capacity(sites.len());
    let mut interrupted = false;

    for (idx, site) in sites.iter().enumerate() {
        if idx > 0 && !inter_site_delay.is_zero() {
            tracing::debug!(delay_secs = inter_site_delay.as_secs(), "pausing between sites");
            if interruptible(tokio::time::sleep(inter_site_delay)).await.is_err() {
                interrupted = true;
                break;
            }
        }

        println!(
            "\n[{}/{}] {} ({})",
            idx + 1,
            sites.len(),
            site.display_name,
            site.search_url
        );
        let site_started = Instant::now();
        let outcome = AssertUnwindSafe(process_site(ctx, site))
            .catch_unwind()
            .await;
        let duration = site_started.elapsed();

        let result = match outcome {
            Ok(Ok(report)) => {
                tracing::info!(
                    site = %site.id,
                    locations = report.locations,
                    elapsed_secs = duration.as_secs_f64(),
                    "site finished"
                );
                SiteResult::success(site.id, duration, report)
            }
            Ok(Err(e)) if is_interrupt(&e) => {
                tracing::warn!(site = %site.id, "run interrupted");
                interrupted = true;
                break;
            }
            Ok(Err(e)) => {
                let message = format!("{e:#}");
                tracing::error!(site = %site.id, error = %message, "site failed");
                SiteResult::failure(site.id, duration, message)
            }
            Err(payload) => {
                let message = format!("panicked: {}", panic_message(&*payload));
                tracing::error!(site = %site.id, error = %message, "site failed");
                SiteResult::failure(site.id, duration, message)
            }
        };
        results.push(result);
    }

    RunSummary {
        results,
        planned: sites.len(),
        interrupted,
        total_duration: started.elapsed(),
    }
}

fn is_interrupt(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ScraperError>(),
        Some(ScraperError::Interrupted)
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Print the aggregate run summary to stdout.
pub(crate) fn print_summary(summary: &RunSummary) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("RUN SUMMARY");
    println!("{rule}");
    println!(
        "Sites processed:  {}/{}",
        summary.results.len(),
        summary.planned
    );
    println!("Successful:       {}", summary.successes());
    println!("Failed:           {}", summary.failures());
    println!("Total locations:  {}", summary.total_locations());
    println!(
        "Total time:       {:.1}s",
        summary.total_duration.as_secs_f64()
    );
    println!();

    for result in &summary.results {
        let secs = result.duration.as_secs_f64();
        match result.status {
            SiteStatus::Success => {
                let phones = result
                    .phones_found
                    .map(|n| format!(", {n} phones"))
                    .unwrap_or_default();
                let path = result
                    .output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "  \u{2713} {:<10} {:>5} locations{phones}  {secs:>6.1}s  {path}",
                    result.site.as_str(),
                    result.locations,
                );
            }
            SiteStatus::Failure => {
                let err_msg = result.error.as_deref().unwrap_or("unknown error");
                println!(
                    "  \u{2717} {:<10} {err_msg}  {secs:>6.1}s",
                    result.site.as_str()
                );
            }
        }
    }

    if summary.interrupted {
        println!("\nInterrupted: remaining sites were not run.");
    }
    println!(
        "\nFinished at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

use std::cell::RefCell;

use locscrape_core::SiteTable;

use super::*;

fn all_sites() -> Vec<SiteConfig> {
    SiteTable::builtin().all().to_vec()
}

fn report(locations: usize) -> SiteReport {
    SiteReport {
        locations,
        phones_found: None,
        output_path: PathBuf::from(format!("output/{locations}.csv")),
    }
}

fn done(report: SiteReport) -> anyhow::Result<SiteReport> {
    Ok(report)
}

#[tokio::test]
async fn failing_site_does_not_stop_the_next() {
    let calls = RefCell::new(Vec::new());

    let summary = run_sites(&calls, &all_sites(), Duration::ZERO, |calls, site| {
        Box::pin(async move {
            calls.borrow_mut().push(site.id);
            if site.id == SiteId::GmCollin {
                anyhow::bail!("webdriver session could not start");
            }
            Ok(report(12))
        })
    })
    .await;

    assert_eq!(*calls.borrow(), vec![SiteId::GmCollin, SiteId::YkCanada]);
    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.successes(), 1);
    assert_eq!(summary.failures(), 1);
    assert_eq!(summary.total_locations(), 12);
    assert!(!summary.interrupted);

    let failed = &summary.results[0];
    assert_eq!(failed.status, SiteStatus::Failure);
    assert_eq!(
        failed.error.as_deref(),
        Some("webdriver session could not start")
    );
    assert_eq!(failed.output_path, None);

    let ok = &summary.results[1];
    assert_eq!(ok.site, SiteId::YkCanada);
    assert_eq!(ok.status, SiteStatus::Success);
    assert_eq!(ok.output_path, Some(PathBuf::from("output/12.csv")));
}

#[tokio::test]
async fn panicking_site_is_recorded_as_failure() {
    let summary = run_sites(&(), &all_sites(), Duration::ZERO, |(), site| {
        Box::pin(async move {
            assert!(site.id != SiteId::GmCollin, "selector table corrupted");
            done(report(3))
        })
    })
    .await;

    assert_eq!(summary.results.len(), 2);
    let failed = &summary.results[0];
    assert_eq!(failed.status, SiteStatus::Failure);
    assert!(failed
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("panicked: ") && e.contains("selector table corrupted")));
    assert_eq!(summary.results[1].status, SiteStatus::Success);
}

#[tokio::test]
async fn interrupt_stops_the_run() {
    let calls = RefCell::new(0_usize);

    let summary = run_sites(&calls, &all_sites(), Duration::ZERO, |calls, _site| {
        Box::pin(async move {
            *calls.borrow_mut() += 1;
            Err::<SiteReport, _>(anyhow::Error::from(ScraperError::Interrupted))
        })
    })
    .await;

    assert_eq!(*calls.borrow(), 1);
    assert!(summary.interrupted);
    assert!(summary.results.is_empty());
    assert_eq!(summary.planned, 2);
}

#[tokio::test]
async fn enrichment_counts_are_carried_into_results() {
    let summary = run_sites(&(), &all_sites(), Duration::ZERO, |(), _site| {
        Box::pin(async move {
            done(SiteReport {
                phones_found: Some(4),
                ..report(10)
            })
        })
    })
    .await;

    assert_eq!(summary.total_locations(), 20);
    assert!(summary
        .results
        .iter()
        .all(|r| r.phones_found == Some(4)));
}

#[tokio::test(start_paused = true)]
async fn sites_are_spaced_but_the_last_is_not_followed_by_a_pause() {
    let delay = Duration::from_secs(30);
    let started = tokio::time::Instant::now();
    let calls = RefCell::new(Vec::new());

    let summary = run_sites(&calls, &all_sites(), delay, |calls, _site| {
        Box::pin(async move {
            calls.borrow_mut().push(tokio::time::Instant::now());
            done(report(1))
        })
    })
    .await;

    let calls = calls.into_inner();
    assert_eq!(summary.successes(), 2);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0] - started, Duration::ZERO);
    assert_eq!(calls[1] - calls[0], delay);
    assert_eq!(started.elapsed(), delay);
}

#[test]
fn panic_message_handles_common_payloads() {
    let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
    let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
    let other: Box<dyn Any + Send> = Box::new(7_u8);
    assert_eq!(panic_message(&*owned), "owned");
    assert_eq!(panic_message(&*borrowed), "borrowed");
    assert_eq!(panic_message(&*other), "unknown panic payload");
}

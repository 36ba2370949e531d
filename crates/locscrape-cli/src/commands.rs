//! Command handlers called from `main` once configuration is loaded.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use locscrape_core::{AppConfig, ConfigError, SiteConfig, SiteId, SiteTable};
use locscrape_scraper::{
    enrich_with_phones, scrape_site, Launcher, LookupSettings, ScrapeSettings, WebDriverLauncher,
};

use crate::orchestrator::{print_summary, run_sites, SiteReport};
use crate::output;

#[derive(Debug, Clone, Default)]
pub(crate) struct RunOptions {
    pub sites: Vec<String>,
    pub phones: bool,
    pub phone_limit: Option<usize>,
    pub headful: bool,
    pub dry_run: bool,
}

/// Shared state handed to every site run.
struct ScrapeContext<L> {
    launcher: L,
    settings: ScrapeSettings,
    output_dir: PathBuf,
}

fn launcher_for(config: &AppConfig, headful: bool) -> WebDriverLauncher {
    let launcher = WebDriverLauncher::from_config(config);
    if headful {
        launcher.headful()
    } else {
        launcher
    }
}

/// Resolve the requested identifiers against the site table, keeping the
/// order given and dropping repeats. No identifiers selects every site.
pub(crate) fn resolve_sites(
    table: &SiteTable,
    requested: &[String],
) -> Result<Vec<SiteConfig>, ConfigError> {
    if requested.is_empty() {
        return Ok(table.all().to_vec());
    }

    let mut seen = HashSet::new();
    let mut sites = Vec::new();
    for raw in requested {
        let id: SiteId = raw.parse()?;
        if !seen.insert(id) {
            continue;
        }
        let site = table
            .get(id)
            .ok_or_else(|| ConfigError::UnknownSite(raw.clone()))?;
        sites.push(site.clone());
    }
    Ok(sites)
}

/// Scrape the selected sites and write one CSV per site.
///
/// # Errors
///
/// Returns an error for an unknown site identifier, an output directory that
/// cannot be created, a user interrupt, or when every site failed.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    table: &SiteTable,
    options: &RunOptions,
) -> anyhow::Result<()> {
    let sites = resolve_sites(table, &options.sites)?;

    if options.dry_run {
        print_plan(&sites, &config.output_dir, options);
        return Ok(());
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let ctx = ScrapeContext {
        launcher: launcher_for(config, options.headful),
        settings: ScrapeSettings::from_config(config, options.phones, options.phone_limit),
        output_dir: config.output_dir.clone(),
    };

    println!("Scraping {} site(s)...", sites.len());
    let summary = run_sites(&ctx, &sites, config.inter_site_delay(), |ctx, site| {
        Box::pin(scrape_and_write(ctx, site))
    })
    .await;
    print_summary(&summary);

    if summary.interrupted {
        anyhow::bail!("run interrupted by user");
    }
    if !summary.results.is_empty() && summary.successes() == 0 {
        anyhow::bail!("all {} sites failed", summary.results.len());
    }
    Ok(())
}

async fn scrape_and_write<L: Launcher>(
    ctx: &ScrapeContext<L>,
    site: &SiteConfig,
) -> anyhow::Result<SiteReport> {
    let scrape = scrape_site(&ctx.launcher, site, &ctx.settings).await?;

    let output_path = ctx.output_dir.join(site.output_file_name());
    output::write_locations_file(&output_path, &scrape.records, ctx.settings.enrich_phones)?;

    Ok(SiteReport {
        locations: scrape.records.len(),
        phones_found: ctx.settings.enrich_phones.then_some(scrape.phones_found),
        output_path,
    })
}

fn print_plan(sites: &[SiteConfig], output_dir: &Path, options: &RunOptions) {
    println!("dry-run: would scrape {} site(s):", sites.len());
    for site in sites {
        println!(
            "  {:<10} {}  ({} search terms) -> {}",
            site.id.as_str(),
            site.search_url,
            site.search_terms.len(),
            output_dir.join(site.output_file_name()).display()
        );
    }
    if options.phones {
        let cap = options
            .phone_limit
            .map_or_else(|| "every location".to_string(), |n| format!("at most {n} per site"));
        println!("phone lookup: {cap}");
    }
}

/// Print every supported site with its accepted identifiers.
pub(crate) fn list_sites(table: &SiteTable) {
    for site in table.all() {
        println!(
            "{:<10} {:<12} {}  ({} search terms)",
            site.id.as_str(),
            site.display_name,
            site.search_url,
            site.search_terms.len()
        );
        println!("           aliases: {}", site.id.aliases().join(", "));
    }
}

/// Add phone numbers to the rows of an existing CSV.
///
/// # Errors
///
/// Returns an error if the input cannot be read or lacks required columns,
/// the browser session cannot be started, the output cannot be written, or
/// the user interrupts.
pub(crate) async fn run_enrich(
    config: &AppConfig,
    input: &Path,
    output_path: Option<&Path>,
    limit: Option<usize>,
    headful: bool,
) -> anyhow::Result<()> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let mut records = output::read_locations(file)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let output_path = output_path.map_or_else(|| output::enriched_path(input), Path::to_path_buf);

    if records.is_empty() {
        println!("{} has no rows; nothing to enrich", input.display());
        return Ok(());
    }

    let looked_up = limit.map_or(records.len(), |n| n.min(records.len()));
    println!(
        "Looking up phones for {looked_up} of {} locations...",
        records.len()
    );

    let launcher = launcher_for(config, headful);
    let settings = LookupSettings::from(config);
    let found = enrich_with_phones(&launcher, &mut records, &settings, limit).await?;

    output::write_locations_file(&output_path, &records, true)?;
    println!("Found phones for {found}/{looked_up} locations");
    println!("Wrote {}", output_path.display());
    Ok(())
}

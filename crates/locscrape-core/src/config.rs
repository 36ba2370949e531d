use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed or
/// the resulting settings are inconsistent.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed or
/// the resulting settings are inconsistent.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so tests
/// can drive them from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{raw}\""),
            }),
        }
    };

    let log_level = or_default("LOCSCRAPE_LOG_LEVEL", "info");
    let webdriver_url = or_default("LOCSCRAPE_WEBDRIVER_URL", "http://localhost:4444");
    let headless = parse_bool("LOCSCRAPE_HEADLESS", true)?;
    let user_agent = or_default("LOCSCRAPE_USER_AGENT", DEFAULT_USER_AGENT);
    let output_dir = PathBuf::from(or_default("LOCSCRAPE_OUTPUT_DIR", "./output"));
    let sites_path = lookup("LOCSCRAPE_SITES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let form_timeout_secs = parse_u64("LOCSCRAPE_FORM_TIMEOUT_SECS", "15")?;
    let results_delay_secs = parse_u64("LOCSCRAPE_RESULTS_DELAY_SECS", "5")?;
    let alert_timeout_secs = parse_u64("LOCSCRAPE_ALERT_TIMEOUT_SECS", "2")?;
    let inter_site_delay_secs = parse_u64("LOCSCRAPE_INTER_SITE_DELAY_SECS", "3")?;
    let phone_results_timeout_secs = parse_u64("LOCSCRAPE_PHONE_RESULTS_TIMEOUT_SECS", "10")?;
    let phone_delay_min_secs = parse_u64("LOCSCRAPE_PHONE_DELAY_MIN_SECS", "2")?;
    let phone_delay_max_secs = parse_u64("LOCSCRAPE_PHONE_DELAY_MAX_SECS", "5")?;

    if webdriver_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "LOCSCRAPE_WEBDRIVER_URL must be non-empty".to_string(),
        ));
    }

    if phone_delay_min_secs > phone_delay_max_secs {
        return Err(ConfigError::Validation(format!(
            "phone delay range is inverted: min {phone_delay_min_secs}s > max {phone_delay_max_secs}s"
        )));
    }

    Ok(AppConfig {
        log_level,
        webdriver_url,
        headless,
        user_agent,
        output_dir,
        sites_path,
        form_timeout_secs,
        results_delay_secs,
        alert_timeout_secs,
        inter_site_delay_secs,
        phone_results_timeout_secs,
        phone_delay_min_secs,
        phone_delay_max_secs,
    })
}

/// Parse the usual spellings of an on/off flag.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

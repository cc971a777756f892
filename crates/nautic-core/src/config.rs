use crate::app_config::{AppConfig, Environment, RemoteImagePolicy};
use crate::ConfigError;

/// Stock photo shown for imported products that have no image of their own.
pub const DEFAULT_IMAGE_URL: &str = "https://images.pexels.com/photos/163236/luxury-yacht-boat-speed-water-163236.jpeg?auto=compress&cs=tinysrgb&w=800";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so the only failures are malformed values.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("NAUTIC_ENV", "development"));
    let log_level = or_default("NAUTIC_LOG_LEVEL", "info");

    let catalog_path = PathBuf::from(or_default("NAUTIC_CATALOG_PATH", "./public/ricambi.json"));
    let seed_sql_path = PathBuf::from(or_default(
        "NAUTIC_SEED_SQL_PATH",
        "./supabase/migrations/20251120000000_import_ricambi_from_csv.sql",
    ));
    let asset_dir = PathBuf::from(or_default("NAUTIC_ASSET_DIR", "./public/ricambi-images"));
    let asset_url_prefix = normalize_asset_prefix(&or_default(
        "NAUTIC_ASSET_URL_PREFIX",
        "/ricambi-images/",
    ))
    .map_err(|reason| invalid("NAUTIC_ASSET_URL_PREFIX", reason))?;
    let brands_path = PathBuf::from(or_default("NAUTIC_BRANDS_PATH", "./config/brands.yaml"));
    let default_image_url = or_default("NAUTIC_DEFAULT_IMAGE_URL", DEFAULT_IMAGE_URL);

    let image_max_probes = parse_u32("NAUTIC_IMAGE_MAX_PROBES", "300")?;
    let remote_image_policy =
        parse_remote_policy(&or_default("NAUTIC_REMOTE_IMAGE_POLICY", "passthrough"))
            .map_err(|reason| invalid("NAUTIC_REMOTE_IMAGE_POLICY", reason))?;

    let download_timeout_secs = parse_u64("NAUTIC_DOWNLOAD_TIMEOUT_SECS", "30")?;
    let download_user_agent = or_default("NAUTIC_DOWNLOAD_USER_AGENT", "nautic/0.1 (catalog-tools)");
    let download_delay_ms = parse_u64("NAUTIC_DOWNLOAD_DELAY_MS", "100")?;
    let download_max_redirects = parse_u32("NAUTIC_DOWNLOAD_MAX_REDIRECTS", "5")?;
    let download_max_retries = parse_u32("NAUTIC_DOWNLOAD_MAX_RETRIES", "0")?;
    let download_retry_backoff_base_secs =
        parse_u64("NAUTIC_DOWNLOAD_RETRY_BACKOFF_BASE_SECS", "1")?;

    let storefront_domain = or_default("NAUTIC_STOREFRONT_DOMAIN", "nautica-5-0.myshopify.com");
    let storefront_token = lookup("NAUTIC_STOREFRONT_TOKEN")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let storefront_api_version = or_default("NAUTIC_STOREFRONT_API_VERSION", "2024-01");
    let catalog_url = lookup("NAUTIC_CATALOG_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        seed_sql_path,
        asset_dir,
        asset_url_prefix,
        brands_path,
        default_image_url,
        image_max_probes,
        remote_image_policy,
        download_timeout_secs,
        download_user_agent,
        download_delay_ms,
        download_max_redirects,
        download_max_retries,
        download_retry_backoff_base_secs,
        storefront_domain,
        storefront_token,
        storefront_api_version,
        catalog_url,
    })
}

impl AppConfig {
    /// Returns the storefront access token, or an error naming the variable
    /// that has to be set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `NAUTIC_STOREFRONT_TOKEN` is unset.
    pub fn require_storefront_token(&self) -> Result<&str, ConfigError> {
        self.storefront_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("NAUTIC_STOREFRONT_TOKEN".to_string()))
    }

    /// Returns the published catalog URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `NAUTIC_CATALOG_URL` is unset.
    pub fn require_catalog_url(&self) -> Result<&str, ConfigError> {
        self.catalog_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("NAUTIC_CATALOG_URL".to_string()))
    }
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_remote_policy(s: &str) -> Result<RemoteImagePolicy, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "passthrough" => Ok(RemoteImagePolicy::Passthrough),
        "probe" => Ok(RemoteImagePolicy::Probe),
        other => Err(format!(
            "unknown policy '{other}'; expected 'passthrough' or 'probe'"
        )),
    }
}

/// Asset prefixes are compared with `starts_with` and concatenated with
/// filenames, so both slashes are required.
fn normalize_asset_prefix(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return Err(format!("'{trimmed}' must start with '/'"));
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/"))
    }
}

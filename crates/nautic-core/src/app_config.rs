use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the runtime image resolver treats references that are absolute
/// `http(s)://` URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteImagePolicy {
    /// Load the remote URL as-is, without probing the asset directory.
    Passthrough,
    /// Derive the filename from the remote URL and probe the local asset
    /// directory for it.
    Probe,
}

impl std::fmt::Display for RemoteImagePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteImagePolicy::Passthrough => write!(f, "passthrough"),
            RemoteImagePolicy::Probe => write!(f, "probe"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub seed_sql_path: PathBuf,
    pub asset_dir: PathBuf,
    /// URL prefix the asset directory is served under; always starts and
    /// ends with `/`, e.g. `"/ricambi-images/"`.
    pub asset_url_prefix: String,
    pub brands_path: PathBuf,
    /// Image used for imported rows that carry no `Image Src`.
    pub default_image_url: String,
    pub image_max_probes: u32,
    pub remote_image_policy: RemoteImagePolicy,
    pub download_timeout_secs: u64,
    pub download_user_agent: String,
    pub download_delay_ms: u64,
    pub download_max_redirects: u32,
    pub download_max_retries: u32,
    pub download_retry_backoff_base_secs: u64,
    pub storefront_domain: String,
    pub storefront_token: Option<String>,
    pub storefront_api_version: String,
    pub catalog_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("seed_sql_path", &self.seed_sql_path)
            .field("asset_dir", &self.asset_dir)
            .field("asset_url_prefix", &self.asset_url_prefix)
            .field("brands_path", &self.brands_path)
            .field("default_image_url", &self.default_image_url)
            .field("image_max_probes", &self.image_max_probes)
            .field("remote_image_policy", &self.remote_image_policy)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("download_user_agent", &self.download_user_agent)
            .field("download_delay_ms", &self.download_delay_ms)
            .field("download_max_redirects", &self.download_max_redirects)
            .field("download_max_retries", &self.download_max_retries)
            .field(
                "download_retry_backoff_base_secs",
                &self.download_retry_backoff_base_secs,
            )
            .field("storefront_domain", &self.storefront_domain)
            .field(
                "storefront_token",
                &self.storefront_token.as_ref().map(|_| "[redacted]"),
            )
            .field("storefront_api_version", &self.storefront_api_version)
            .field("catalog_url", &self.catalog_url)
            .finish()
    }
}

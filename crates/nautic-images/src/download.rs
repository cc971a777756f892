//! Sequential downloader that mirrors remote product images into the asset
//! directory.
//!
//! Every distinct URL gets a 1-based index `n` in first-seen order and is
//! stored as `<n>-<filename>`. The index is what the runtime probe later
//! walks, so the numbering must stay stable for a given catalog.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nautic_core::{AppConfig, ProductRecord};
use reqwest::{redirect, Client, StatusCode, Url};
use tokio::io::AsyncWriteExt;

use crate::error::ImageError;
use crate::retry::retry_with_backoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub asset_dir: PathBuf,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Pause between consecutive downloads.
    pub delay_ms: u64,
    pub max_redirects: u32,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl DownloadSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            asset_dir: config.asset_dir.clone(),
            timeout_secs: config.download_timeout_secs,
            user_agent: config.download_user_agent.clone(),
            delay_ms: config.download_delay_ms,
            max_redirects: config.download_max_redirects,
            max_retries: config.download_max_retries,
            backoff_base_secs: config.download_retry_backoff_base_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub distinct_urls: usize,
    pub downloaded: usize,
    pub failed: usize,
}

/// Distinct non-empty image references in first-seen order.
#[must_use]
pub fn unique_image_urls(records: &[ProductRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.image_ref.as_str())
        .filter(|url| !url.is_empty() && seen.insert(*url))
        .map(str::to_owned)
        .collect()
}

/// Filename for the `position`-th (1-based) URL of a batch.
///
/// Uses the last path segment of the URL; URLs without one are stored as
/// `<n>-image-<n>`.
#[must_use]
pub fn stored_filename(position: usize, url: &Url) -> String {
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map_or_else(|| format!("image-{position}"), str::to_owned);
    format!("{position}-{name}")
}

pub struct ImageDownloader {
    client: Client,
    settings: DownloadSettings,
}

impl ImageDownloader {
    /// Builds the HTTP client. Automatic redirects are disabled so the hop
    /// limit and the [`ImageError::TooManyRedirects`] error are ours.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Http`] if the client cannot be constructed.
    pub fn new(settings: DownloadSettings) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client, settings })
    }

    #[must_use]
    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    /// Downloads every URL in order, one at a time.
    ///
    /// Per-URL failures are logged and counted; the batch always continues.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Io`] only if the asset directory cannot be
    /// created.
    pub async fn download_all(&self, urls: &[String]) -> Result<DownloadSummary, ImageError> {
        let dir = &self.settings.asset_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ImageError::Io {
                path: dir.display().to_string(),
                source,
            })?;

        let mut summary = DownloadSummary {
            distinct_urls: urls.len(),
            ..DownloadSummary::default()
        };

        for (i, url) in urls.iter().enumerate() {
            let position = i + 1;
            if i > 0 && self.settings.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.settings.delay_ms)).await;
            }

            match self.download_indexed(position, url).await {
                Ok(path) => {
                    summary.downloaded += 1;
                    tracing::info!(
                        position,
                        total = urls.len(),
                        file = %path.display(),
                        "downloaded image"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(position, url = %url, error = %e, "image download failed");
                }
            }
        }

        Ok(summary)
    }

    async fn download_indexed(&self, position: usize, url: &str) -> Result<PathBuf, ImageError> {
        let parsed = parse_url(url)?;
        let dest = self
            .settings
            .asset_dir
            .join(stored_filename(position, &parsed));
        self.download_to(parsed, &dest).await?;
        Ok(dest)
    }

    /// Downloads one URL to `dest`, retrying transient failures.
    ///
    /// A partially written file is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] on network failure, a non-200 final status,
    /// a broken or overlong redirect chain, or a write failure.
    pub async fn download_to(&self, url: Url, dest: &Path) -> Result<u64, ImageError> {
        retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_secs,
            || {
                let url = url.clone();
                async move {
                    let response = self.get_following_redirects(url).await?;
                    write_body(response, dest).await
                }
            },
        )
        .await
    }

    async fn get_following_redirects(&self, start: Url) -> Result<reqwest::Response, ImageError> {
        let mut url = start.clone();
        let mut hops = 0u32;

        loop {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if is_followed_redirect(status) {
                if hops >= self.settings.max_redirects {
                    return Err(ImageError::TooManyRedirects {
                        url: start.to_string(),
                        max_redirects: self.settings.max_redirects,
                    });
                }
                let next = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| url.join(loc).ok())
                    .ok_or_else(|| ImageError::MissingRedirectLocation {
                        url: url.to_string(),
                    })?;
                tracing::debug!(from = %url, to = %next, hop = hops + 1, "following redirect");
                url = next;
                hops += 1;
                continue;
            }

            if status != StatusCode::OK {
                return Err(ImageError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            return Ok(response);
        }
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn parse_url(url: &str) -> Result<Url, ImageError> {
    let parsed = Url::parse(url).map_err(|e| ImageError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ImageError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

async fn write_body(mut response: reqwest::Response, dest: &Path) -> Result<u64, ImageError> {
    let io_err = |source| ImageError::Io {
        path: dest.display().to_string(),
        source,
    };

    let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
    let result: Result<u64, ImageError> = async {
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;
        Ok(written)
    }
    .await;

    if result.is_err() {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(dest).await {
            tracing::warn!(file = %dest.display(), error = %e, "failed to remove partial download");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn record(n: usize, image_ref: &str) -> ProductRecord {
        ProductRecord {
            id: ProductRecord::local_id(n),
            name: format!("Ricambio {n}"),
            description: String::new(),
            price: Decimal::TEN,
            image_ref: image_ref.to_owned(),
            category: "Altri".to_owned(),
            in_stock: true,
            handle: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unique_urls_keep_first_seen_order_and_skip_empty() {
        let records = vec![
            record(1, "https://cdn.example.com/b.jpg"),
            record(2, ""),
            record(3, "https://cdn.example.com/a.jpg"),
            record(4, "https://cdn.example.com/b.jpg"),
        ];
        assert_eq!(
            unique_image_urls(&records),
            vec!["https://cdn.example.com/b.jpg", "https://cdn.example.com/a.jpg"]
        );
    }

    #[test]
    fn stored_filename_uses_last_segment_without_query() {
        let url = Url::parse("https://cdn.shopify.com/s/files/1/0689/1087/4891/files/widget.jpg?v=3").unwrap();
        assert_eq!(stored_filename(4, &url), "4-widget.jpg");
    }

    #[test]
    fn stored_filename_for_unnamed_url() {
        let url = Url::parse("https://cdn.example.com/").unwrap();
        assert_eq!(stored_filename(12, &url), "12-image-12");
    }

    #[test]
    fn parse_url_rejects_local_paths_and_other_schemes() {
        assert!(matches!(
            parse_url("/ricambi-images/widget.jpg"),
            Err(ImageError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_url("ftp://example.com/widget.jpg"),
            Err(ImageError::InvalidUrl { .. })
        ));
        assert!(parse_url("http://example.com/widget.jpg").is_ok());
    }

    #[test]
    fn only_listed_redirect_statuses_are_followed() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_followed_redirect(StatusCode::from_u16(code).unwrap()));
        }
        assert!(!is_followed_redirect(StatusCode::NOT_MODIFIED));
        assert!(!is_followed_redirect(StatusCode::OK));
    }
}

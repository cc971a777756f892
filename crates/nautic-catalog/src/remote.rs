//! Runtime fetch of the published catalog.

use std::time::Duration;

use nautic_core::{AppConfig, ProductRecord};
use reqwest::{Client, StatusCode};

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;

/// Fetches `ricambi.json` from wherever it is published.
pub struct CatalogClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying client cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        Self::new(
            config.download_timeout_secs,
            &config.download_user_agent,
            config.download_max_retries,
            config.download_retry_backoff_base_secs,
        )
    }

    /// Fetches the catalog, propagating every failure.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnexpectedStatus`] for a non-200 response,
    /// [`CatalogError::Http`] on network failure, or [`CatalogError::Json`]
    /// if the body is not a product array.
    pub async fn try_fetch_catalog(&self, url: &str) -> Result<Vec<ProductRecord>, CatalogError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if status != StatusCode::OK {
                return Err(CatalogError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|source| CatalogError::Json {
                context: url.to_owned(),
                source,
            })
        })
        .await
    }

    /// Fetches the catalog, degrading to an empty listing on any failure.
    pub async fn fetch_catalog(&self, url: &str) -> Vec<ProductRecord> {
        match self.try_fetch_catalog(url).await {
            Ok(products) => {
                tracing::info!(url, count = products.len(), "loaded catalog");
                products
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "catalog unavailable, showing empty listing");
                Vec::new()
            }
        }
    }
}

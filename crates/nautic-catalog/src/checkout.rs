//! Checkout bridge to the hosted storefront.
//!
//! The site embeds the storefront's buy widget, which needs the numeric
//! product id. Catalog records carry only the handle, so the id is looked up
//! through the Storefront GraphQL API. Checkout never fails outright: any
//! lookup problem falls back to a plain product page link.

use std::time::Duration;

use nautic_core::AppConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;

const PRODUCT_ID_QUERY: &str = "query getProduct($handle: String!) { product(handle: $handle) { id } }";

/// What the caller knows about the product to sell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductReference {
    /// Numeric storefront product id, used directly.
    Id(String),
    Handle(String),
}

impl ProductReference {
    /// All-digit input is an id, anything else a handle.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Self::Id(raw.to_owned())
        } else {
            Self::Handle(raw.to_owned())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// Render the embedded buy widget for this product id.
    Widget { product_id: String },
    /// Send the shopper to the storefront product page.
    Link { url: String },
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ProductData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct ProductData {
    product: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Trailing segment of a `gid://shopify/Product/<n>` global id.
#[must_use]
pub fn numeric_id_from_gid(gid: &str) -> Option<&str> {
    gid.rsplit('/').next().filter(|s| !s.is_empty())
}

pub struct StorefrontClient {
    client: Client,
    domain: String,
    token: String,
    endpoint: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("domain", &self.domain)
            .field("token", &"[redacted]")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// Client for `https://<domain>/api/<api_version>/graphql.json`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying client cannot be built.
    pub fn new(
        domain: &str,
        token: &str,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            domain: domain.to_owned(),
            token: token.to_owned(),
            endpoint: format!("https://{domain}/api/{api_version}/graphql.json"),
            max_retries: 0,
            backoff_base_secs: 0,
        })
    }

    /// Builds a client from configuration; the storefront token is required.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] when no token is configured, or
    /// [`CatalogError::Http`] if the underlying client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let token = config.require_storefront_token()?;
        Ok(Self::new(
            &config.storefront_domain,
            token,
            &config.storefront_api_version,
            config.download_timeout_secs,
            &config.download_user_agent,
        )?
        .with_retries(
            config.download_max_retries,
            config.download_retry_backoff_base_secs,
        ))
    }

    /// Overrides the GraphQL endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    /// Storefront product page for `handle`.
    #[must_use]
    pub fn product_link(&self, handle: &str) -> String {
        format!("https://{}/products/{handle}", self.domain)
    }

    /// Looks up the numeric product id for `handle`. `Ok(None)` means the
    /// storefront has no such product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on network failure, a non-success status,
    /// an unparseable body, or GraphQL errors in the response.
    pub async fn lookup_product_id(&self, handle: &str) -> Result<Option<String>, CatalogError> {
        let body = json!({
            "query": PRODUCT_ID_QUERY,
            "variables": { "handle": handle },
        });

        let parsed: GraphqlResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
                let body = body.clone();
                async move {
                    let response = self
                        .client
                        .post(&self.endpoint)
                        .header("X-Shopify-Storefront-Access-Token", &self.token)
                        .json(&body)
                        .send()
                        .await?;
                    let status = response.status();
                    if !status.is_success() {
                        return Err(CatalogError::UnexpectedStatus {
                            status: status.as_u16(),
                            url: self.endpoint.clone(),
                        });
                    }
                    let text = response.text().await?;
                    serde_json::from_str(&text).map_err(|source| CatalogError::Json {
                        context: "storefront product lookup".to_owned(),
                        source,
                    })
                }
            })
            .await?;

        if let Some(first) = parsed.errors.first() {
            return Err(CatalogError::Storefront(first.message.clone()));
        }

        Ok(parsed
            .data
            .and_then(|d| d.product)
            .and_then(|p| numeric_id_from_gid(&p.id).map(str::to_owned)))
    }

    /// Decides how to offer `reference` for sale. Never fails.
    pub async fn resolve(&self, reference: &ProductReference) -> CheckoutTarget {
        let handle = match reference {
            ProductReference::Id(id) => {
                return CheckoutTarget::Widget {
                    product_id: id.clone(),
                }
            }
            ProductReference::Handle(handle) => handle,
        };

        match self.lookup_product_id(handle).await {
            Ok(Some(product_id)) => CheckoutTarget::Widget { product_id },
            Ok(None) => {
                tracing::warn!(handle = %handle, "storefront product not found, using product link");
                CheckoutTarget::Link {
                    url: self.product_link(handle),
                }
            }
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "storefront lookup failed, using product link");
                CheckoutTarget::Link {
                    url: self.product_link(handle),
                }
            }
        }
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A spare-parts catalog entry as published in `ricambi.json`.
///
/// Field names on the wire match what the storefront pages read, so
/// `image_ref` is serialized as `image_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// `local-<n>`, assigned once at import time.
    pub id: String,
    pub name: String,
    /// Plain text cleaned from the export's rich-text body.
    #[serde(default)]
    pub description: String,
    /// Price in EUR, written as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Remote URL from the commerce platform, or `<asset-prefix><filename>`
    /// once reconciliation has matched a downloaded file.
    #[serde(rename = "image_url")]
    pub image_ref: String,
    #[serde(default)]
    pub category: String,
    pub in_stock: bool,
    #[serde(default)]
    pub handle: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Builds the catalog id for the `n`-th imported product (1-based).
    #[must_use]
    pub fn local_id(n: usize) -> String {
        format!("local-{n}")
    }

    /// Returns `true` if the image reference already points into the local
    /// asset directory served under `asset_prefix`.
    #[must_use]
    pub fn has_local_image(&self, asset_prefix: &str) -> bool {
        self.image_ref.starts_with(asset_prefix)
    }
}

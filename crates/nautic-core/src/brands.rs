use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Brand keywords the dealership filters spare parts by, in display
/// priority order. `SEA DOO` and `SEA-DOO` are spellings of one brand and
/// both emit the `SEA DOO` label.
pub const DEFAULT_BRAND_KEYWORDS: &[&str] = &[
    "SEA DOO",
    "SEA-DOO",
    "MERCURISER",
    "EVINRUDE",
    "KAWASAKI",
    "YAMAHA",
    "JOHNSON",
    "TOHATSU",
    "CHAMPION",
    "MERCURY",
    "CUMMINS",
    "YANMAR",
    "SUZUKI",
    "RECMAR",
    "HONDA",
    "VOLVO",
    "BRP",
    "NGK",
];

/// Ordered list of brand keywords matched against product names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandKeywords {
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BrandsFile {
    brands: Vec<String>,
}

impl Default for BrandKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_BRAND_KEYWORDS.iter().copied())
    }
}

impl BrandKeywords {
    /// Builds a keyword list, upper-casing and whitespace-normalizing each entry.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| normalize_name(k.as_ref()))
                .collect(),
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Extracts the brands mentioned in a product name.
    ///
    /// Each keyword also matches with spaces and hyphens interchanged, so
    /// `"SEA-DOO"` in a name matches the keyword `"SEA DOO"` and vice versa.
    /// Labels are canonicalized (hyphens become spaces), deduplicated, and
    /// returned in keyword-list order rather than order of appearance.
    #[must_use]
    pub fn extract_brands(&self, name: &str) -> Vec<String> {
        let upper = normalize_name(name);
        if upper.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<String> = Vec::new();
        for keyword in &self.keywords {
            let variants = [
                keyword.clone(),
                keyword.replace(' ', "-"),
                keyword.replace('-', " "),
            ];
            if variants.iter().any(|v| upper.contains(v.as_str())) {
                let label = canonical_label(keyword);
                if !found.contains(&label) {
                    found.push(label);
                }
            }
        }
        found
    }
}

/// Upper-cases and collapses internal whitespace runs to single spaces.
fn normalize_name(raw: &str) -> String {
    raw.to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonical_label(keyword: &str) -> String {
    keyword.replace('-', " ")
}

/// Load and validate brand keywords from a YAML file of the form
/// `brands: [ ... ]`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brand_keywords(path: &Path) -> Result<BrandKeywords, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let brands_file: BrandsFile = serde_yaml::from_str(&content)?;
    validate_brands(&brands_file)?;

    Ok(BrandKeywords::new(brands_file.brands))
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    if brands_file.brands.is_empty() {
        return Err(ConfigError::Validation(
            "brand keyword list must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for brand in &brands_file.brands {
        let normalized = normalize_name(brand);
        if normalized.is_empty() {
            return Err(ConfigError::Validation(
                "brand keyword must be non-empty".to_string(),
            ));
        }
        if !seen.insert(normalized) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand keyword: '{brand}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;

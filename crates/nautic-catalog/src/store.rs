//! The published JSON catalog file.

use std::path::Path;

use nautic_core::ProductRecord;

use crate::error::CatalogError;

/// Reads the catalog array from `path`.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the file cannot be read, or
/// [`CatalogError::Json`] if it is not an array of products.
pub fn load_catalog(path: &Path) -> Result<Vec<ProductRecord>, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        context: path.display().to_string(),
        source,
    })
}

/// Writes the catalog as a pretty-printed JSON array, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] on write failure.
pub fn save_catalog(path: &Path, products: &[ProductRecord]) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    };
    let json = serde_json::to_string_pretty(products).map_err(|source| CatalogError::Json {
        context: "catalog".to_owned(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, json).map_err(io_err)?;
    tracing::info!(path = %path.display(), records = products.len(), "wrote catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn product() -> ProductRecord {
        ProductRecord {
            id: "local-1".to_owned(),
            name: "Elica Solas".to_owned(),
            description: "Elica in alluminio".to_owned(),
            price: Decimal::new(18990, 2),
            image_ref: "/ricambi-images/4-elica.png".to_owned(),
            category: "Eliche".to_owned(),
            in_stock: true,
            handle: Some("elica-solas".to_owned()),
            created_at: Utc.with_ymd_and_hms(2025, 11, 20, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn save_then_load_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("ricambi.json");
        save_catalog(&path, &[product()]).unwrap();
        assert_eq!(load_catalog(&path).unwrap(), vec![product()]);
    }

    #[test]
    fn saved_file_uses_front_end_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ricambi.json");
        save_catalog(&path, &[product()]).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {\n"));
        assert!(raw.contains("\"image_url\": \"/ricambi-images/4-elica.png\""));
        assert!(raw.contains("\"price\": 189.9"));
        assert!(raw.contains("\"in_stock\": true"));
    }

    #[test]
    fn load_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ricambi.json");
        std::fs::write(&path, "{\"products\": []}").unwrap();
        assert!(matches!(load_catalog(&path), Err(CatalogError::Json { .. })));
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            load_catalog(Path::new("/nonexistent/ricambi.json")),
            Err(CatalogError::Io { .. })
        ));
    }
}

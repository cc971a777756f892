use std::io::Write;
use std::path::Path;

use super::*;

#[test]
fn extracts_yamaha_and_sea_doo_once_each() {
    let keywords = BrandKeywords::default();
    let brands = keywords.extract_brands("Pompa acqua YAMAHA 115 SEA-DOO");
    assert_eq!(brands, vec!["SEA DOO".to_string(), "YAMAHA".to_string()]);
}

#[test]
fn both_sea_doo_spellings_collapse_to_one_label() {
    let keywords = BrandKeywords::default();
    let brands = keywords.extract_brands("Kit SEA DOO compatibile SEA-DOO");
    assert_eq!(brands, vec!["SEA DOO".to_string()]);
}

#[test]
fn matching_is_case_insensitive_and_ignores_extra_spaces() {
    let keywords = BrandKeywords::default();
    let brands = keywords.extract_brands("girante sea    doo spark");
    assert_eq!(brands, vec!["SEA DOO".to_string()]);
}

#[test]
fn results_follow_keyword_order_not_name_order() {
    let keywords = BrandKeywords::default();
    let brands = keywords.extract_brands("Candela NGK per HONDA e MERCURY");
    assert_eq!(
        brands,
        vec![
            "MERCURY".to_string(),
            "HONDA".to_string(),
            "NGK".to_string()
        ]
    );
}

#[test]
fn no_brand_yields_empty_list() {
    let keywords = BrandKeywords::default();
    assert!(keywords.extract_brands("Grasso marino universale").is_empty());
    assert!(keywords.extract_brands("").is_empty());
}

#[test]
fn custom_keyword_list_is_normalized() {
    let keywords = BrandKeywords::new(["  lombardini ", "Vetus-Maxwell"]);
    assert_eq!(keywords.keywords(), ["LOMBARDINI", "VETUS-MAXWELL"]);
    assert_eq!(
        keywords.extract_brands("Girante VETUS MAXWELL 2"),
        vec!["VETUS MAXWELL".to_string()]
    );
}

#[test]
fn validate_rejects_empty_list() {
    let file = BrandsFile { brands: vec![] };
    let err = validate_brands(&file).unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[test]
fn validate_rejects_blank_keyword() {
    let file = BrandsFile {
        brands: vec!["YAMAHA".to_string(), "   ".to_string()],
    };
    let err = validate_brands(&file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_case_insensitive_duplicates() {
    let file = BrandsFile {
        brands: vec!["Yamaha".to_string(), "YAMAHA".to_string()],
    };
    let err = validate_brands(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate brand keyword"));
}

#[test]
fn validate_allows_hyphen_and_space_spellings_side_by_side() {
    let file = BrandsFile {
        brands: vec!["SEA DOO".to_string(), "SEA-DOO".to_string()],
    };
    assert!(validate_brands(&file).is_ok());
}

#[test]
fn load_brand_keywords_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "brands:\n  - YAMAHA\n  - sea-doo").unwrap();
    let keywords = load_brand_keywords(file.path()).unwrap();
    assert_eq!(keywords.keywords(), ["YAMAHA", "SEA-DOO"]);
}

#[test]
fn load_brand_keywords_reports_missing_file() {
    let err = load_brand_keywords(Path::new("/nonexistent/brands.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::BrandsFileIo { .. }));
}

#[test]
fn load_brand_keywords_reports_bad_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "brands: {{ not: a list").unwrap();
    let err = load_brand_keywords(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::BrandsFileParse(_)));
}

#[test]
fn load_brands_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("brands.yaml");
    assert!(
        path.exists(),
        "brands.yaml missing at {path:?}"
    );
    let keywords = load_brand_keywords(&path).unwrap();
    assert_eq!(keywords, BrandKeywords::default());
}

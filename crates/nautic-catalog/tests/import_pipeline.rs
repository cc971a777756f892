//! End-to-end import: CSV export in, JSON catalog and SQL seed out.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use nautic_catalog::{
    import_csv_file, load_catalog, render_seed_sql, save_catalog, write_seed_sql, FacetIndex,
    FacetSelection, ImportOptions,
};
use nautic_core::BrandKeywords;

const EXPORT: &str = "\
Handle,Title,Body (HTML),Vendor,Type,Variant Price,Image Src,Status
x1,Filtro olio YAMAHA,,Yamaha,,25.50,,active
x1,Filtro olio YAMAHA,,Yamaha,,25.50,https://cdn.shopify.com/s/files/1/0689/1087/4891/files/filtro.jpg,active
x2,Girante SEA-DOO Spark,\"<p>Girante in bronzo per SEA-DOO Spark&nbsp;900</p>\",BRP,,89,https://cdn.shopify.com/s/files/1/0689/1087/4891/files/girante.jpg?v=1,draft
x3,Candela NGK,,NGK,,0,,active
x4,Elica Solas 3 pale,,Solas,,abc,,active
,,,,,,,
";

#[test]
fn import_writes_catalog_and_seed() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("products_export.csv");
    std::fs::write(&csv_path, EXPORT).unwrap();

    let options = ImportOptions {
        default_image_url: "https://images.example.com/default.jpg".to_owned(),
        created_at: Utc.with_ymd_and_hms(2025, 11, 20, 0, 0, 0).unwrap(),
    };
    let output = import_csv_file(&csv_path, &options).unwrap();

    assert_eq!(output.summary.imported, 2);
    assert_eq!(output.summary.skipped_duplicate_handle, 1);
    assert_eq!(output.summary.skipped_invalid_price, 2);

    let filtro = &output.products[0];
    assert_eq!(filtro.price, Decimal::new(255, 1));
    assert_eq!(filtro.category, "Filtri");
    assert_eq!(filtro.image_ref, "https://images.example.com/default.jpg");

    let girante = &output.products[1];
    assert_eq!(girante.id, "local-2");
    assert_eq!(girante.description, "Girante in bronzo per SEA-DOO Spark 900");
    assert!(!girante.in_stock);
    assert_eq!(girante.category, "Altri");

    let catalog_path = dir.path().join("public").join("ricambi.json");
    save_catalog(&catalog_path, &output.products).unwrap();
    assert_eq!(load_catalog(&catalog_path).unwrap(), output.products);

    let seed_path = dir.path().join("seed.sql");
    write_seed_sql(&seed_path, &output.products).unwrap();
    let sql = std::fs::read_to_string(&seed_path).unwrap();
    assert_eq!(sql, render_seed_sql(&output.products));
    assert!(sql.contains("    25.5,\n"));
    assert_eq!(sql.matches("ON CONFLICT DO NOTHING;").count(), 2);

    let index = FacetIndex::new(&output.products, &BrandKeywords::default());
    assert_eq!(index.all_brands(), vec!["SEA DOO", "YAMAHA"]);
    let mut selection = FacetSelection::default();
    selection.toggle_brand(&index, "SEA DOO");
    let found = index.filter(&selection, "bronzo");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].handle.as_deref(), Some("x2"));
}

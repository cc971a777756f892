//! `import`: CSV export to `ricambi.json` and the SQL seed.

use std::path::Path;

use chrono::Utc;
use nautic_catalog::{import_csv_file, save_catalog, write_seed_sql, ImportOptions};
use nautic_core::AppConfig;

pub(crate) fn run_import(config: &AppConfig, csv: &Path, skip_seed: bool) -> anyhow::Result<()> {
    let options = ImportOptions {
        default_image_url: config.default_image_url.clone(),
        created_at: Utc::now(),
    };
    let output = import_csv_file(csv, &options)?;
    let summary = output.summary;

    tracing::info!(
        csv = %csv.display(),
        rows = summary.rows_read,
        imported = summary.imported,
        "parsed product export"
    );

    save_catalog(&config.catalog_path, &output.products)?;
    if !skip_seed {
        write_seed_sql(&config.seed_sql_path, &output.products)?;
    }

    println!(
        "import complete: rows={} imported={} skipped_missing_fields={} skipped_duplicate_handle={} skipped_invalid_price={}",
        summary.rows_read,
        summary.imported,
        summary.skipped_missing_fields,
        summary.skipped_duplicate_handle,
        summary.skipped_invalid_price,
    );
    println!("catalog: {}", config.catalog_path.display());
    if !skip_seed {
        println!("seed: {}", config.seed_sql_path.display());
    }
    Ok(())
}

//! SQL seed migration for the `products` table.

use std::fmt::Write as _;
use std::path::Path;

use nautic_core::ProductRecord;

use crate::error::CatalogError;

const BATCH_SIZE: usize = 100;

fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

/// Renders one `INSERT ... ON CONFLICT DO NOTHING;` per record, with a
/// `-- Batch <n>` marker before every 100 records.
#[must_use]
pub fn render_seed_sql(products: &[ProductRecord]) -> String {
    let mut sql = String::from("-- Import prodotti Ricambi da CSV\n-- Generato automaticamente\n");

    for (i, product) in products.iter().enumerate() {
        if i % BATCH_SIZE == 0 {
            let _ = write!(sql, "\n-- Batch {}", i / BATCH_SIZE + 1);
        }
        let _ = write!(
            sql,
            "\nINSERT INTO products (name, description, price, image_url, category, in_stock) VALUES (\n    \
             '{}',\n    '{}',\n    {},\n    '{}',\n    '{}',\n    {}\n  ) ON CONFLICT DO NOTHING;",
            escape_sql(&product.name),
            escape_sql(&product.description),
            product.price.normalize(),
            escape_sql(&product.image_ref),
            escape_sql(&product.category),
            product.in_stock,
        );
    }

    sql
}

/// Writes the seed migration, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the directory or file cannot be written.
pub fn write_seed_sql(path: &Path, products: &[ProductRecord]) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, render_seed_sql(products)).map_err(io_err)?;
    tracing::info!(path = %path.display(), records = products.len(), "wrote SQL seed");
    Ok(())
}

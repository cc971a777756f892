//! Import of the storefront CSV export into catalog records.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use nautic_core::{strip_markup, truncate_with_ellipsis, ProductRecord};
use rust_decimal::Decimal;

use crate::category::subcategory_for_title;
use crate::error::CatalogError;

/// Descriptions shorter than this are replaced by the title.
const MIN_DESCRIPTION_CHARS: usize = 10;
const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Positions of the export columns we read, located once from the header.
/// Every other column is ignored. A column missing from the header, or a
/// row too short to reach it, reads as an empty field.
#[derive(Debug, Clone, Copy)]
struct Columns {
    handle: Option<usize>,
    title: Option<usize>,
    body_html: Option<usize>,
    variant_price: Option<usize>,
    image_src: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::ByteRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name.as_bytes());
        Self {
            handle: find("Handle"),
            title: find("Title"),
            body_html: find("Body (HTML)"),
            variant_price: find("Variant Price"),
            image_src: find("Image Src"),
            status: find("Status"),
        }
    }
}

/// Non-empty field at `index`, with invalid UTF-8 replaced rather than
/// rejected so one badly encoded cell never costs the row.
fn field(record: &csv::ByteRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .filter(|raw| !raw.is_empty())
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Used for rows without an `Image Src`.
    pub default_image_url: String,
    /// Shared `created_at` for the whole batch.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub imported: usize,
    pub skipped_missing_fields: usize,
    pub skipped_duplicate_handle: usize,
    pub skipped_invalid_price: usize,
}

impl ImportSummary {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_missing_fields + self.skipped_duplicate_handle + self.skipped_invalid_price
    }
}

#[derive(Debug, Clone)]
pub struct ImportOutput {
    pub products: Vec<ProductRecord>,
    pub summary: ImportSummary,
}

fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).ok().filter(|p| *p > Decimal::ZERO)
}

fn clean_description(body: Option<&str>, title: &str) -> String {
    let cleaned = body.map(strip_markup).unwrap_or_default();
    let description = if cleaned.chars().count() < MIN_DESCRIPTION_CHARS {
        title.to_string()
    } else {
        cleaned
    };
    truncate_with_ellipsis(&description, MAX_DESCRIPTION_CHARS)
}

/// Reads a product export and builds catalog records.
///
/// Rows without a title or price are skipped, as are rows repeating an
/// already seen handle (variant rows) and rows whose price is not a positive
/// decimal. The duplicate check runs before the price parse, so a variant
/// row still claims its handle even if its price is bad. Ids are
/// `local-<n>` over the imported rows only.
///
/// # Errors
///
/// Returns [`CatalogError::Csv`] if the input cannot be read as CSV at all.
/// Short rows and badly encoded cells are not errors.
pub fn import_products<R: io::Read>(
    reader: R,
    options: &ImportOptions,
) -> Result<ImportOutput, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut products = Vec::new();
    let mut summary = ImportSummary::default();
    let mut seen_handles = HashSet::new();

    let columns = Columns::locate(csv_reader.byte_headers()?);

    for record in csv_reader.byte_records() {
        let record = record?;
        summary.rows_read += 1;

        let handle = field(&record, columns.handle);
        let (Some(title), Some(price_raw)) = (
            field(&record, columns.title),
            field(&record, columns.variant_price),
        ) else {
            summary.skipped_missing_fields += 1;
            continue;
        };

        if let Some(handle) = &handle {
            if !seen_handles.insert(handle.clone()) {
                summary.skipped_duplicate_handle += 1;
                continue;
            }
        }

        let Some(price) = parse_price(&price_raw) else {
            tracing::debug!(title = %title, price = %price_raw, "skipping row with invalid price");
            summary.skipped_invalid_price += 1;
            continue;
        };

        let status = field(&record, columns.status);
        let in_stock = status
            .as_deref()
            .is_none_or(|s| s.eq_ignore_ascii_case("active"));

        products.push(ProductRecord {
            id: ProductRecord::local_id(products.len() + 1),
            description: clean_description(field(&record, columns.body_html).as_deref(), &title),
            price,
            image_ref: field(&record, columns.image_src)
                .unwrap_or_else(|| options.default_image_url.clone()),
            category: subcategory_for_title(&title).to_string(),
            in_stock,
            handle,
            created_at: options.created_at,
            name: title,
        });
    }

    summary.imported = products.len();
    Ok(ImportOutput { products, summary })
}

/// [`import_products`] over a file on disk.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the file cannot be opened, otherwise as
/// [`import_products`].
pub fn import_csv_file(path: &Path, options: &ImportOptions) -> Result<ImportOutput, CatalogError> {
    let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    import_products(io::BufReader::new(file), options)
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;

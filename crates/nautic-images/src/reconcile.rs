//! Build-time reconciliation of product image references against the
//! downloaded asset directory.

use nautic_core::ProductRecord;

use crate::filename::{basename, extract_filename};
use crate::index::AssetIndex;

/// How many unmatched records are kept as examples in a report.
pub const MAX_MISMATCH_EXAMPLES: usize = 10;

/// An unmatched record kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Lookup key derived from the image reference (may be empty).
    pub key: String,
    pub product_id: String,
    /// Product name, cut to 50 characters.
    pub product_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub total: usize,
    pub matched: usize,
    /// Records whose reference was already local before this run. They are
    /// still looked up again and also count as `matched` or `not_matched`.
    pub already_local: usize,
    pub not_matched: usize,
    pub mismatches: Vec<Mismatch>,
}

impl ReconcileReport {
    /// Percentage of records that resolved to a local file.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.matched as f64 / self.total as f64 * 100.0
    }
}

/// Rewrites every resolvable `image_ref` to `<asset_prefix><stored filename>`.
///
/// Per record, the lookup key is the reference with the asset prefix and
/// any download index stripped when it is already local, or
/// [`extract_filename`] otherwise. The key is resolved through
/// [`AssetIndex::lookup`] (exact, then `.jpg`/`.png` swapped). Unresolved
/// records keep their reference untouched. Running this twice over the same
/// index gives the same result.
pub fn reconcile_records(
    records: &mut [ProductRecord],
    index: &AssetIndex,
    asset_prefix: &str,
) -> ReconcileReport {
    let mut report = ReconcileReport {
        total: records.len(),
        ..ReconcileReport::default()
    };

    for record in records.iter_mut() {
        let key = if let Some(local) = record.image_ref.strip_prefix(asset_prefix) {
            report.already_local += 1;
            basename(local).to_string()
        } else {
            extract_filename(&record.image_ref, asset_prefix)
        };

        let resolved = if key.is_empty() {
            None
        } else {
            index.lookup(&key)
        };

        if let Some(stored) = resolved {
            let local_ref = format!("{asset_prefix}{stored}");
            if report.matched < MAX_MISMATCH_EXAMPLES {
                tracing::debug!(
                    product_id = %record.id,
                    key = %key,
                    stored = %stored,
                    "matched product image"
                );
            }
            record.image_ref = local_ref;
            report.matched += 1;
        } else {
            report.not_matched += 1;
            if report.mismatches.len() < MAX_MISMATCH_EXAMPLES {
                report.mismatches.push(Mismatch {
                    key,
                    product_id: record.id.clone(),
                    product_name: record.name.chars().take(50).collect(),
                });
            }
        }
    }

    report
}

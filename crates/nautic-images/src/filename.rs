//! Filename identity shared by reconciliation and the runtime probe.
//!
//! The downloader stores each image as `<n>-<basename>`, where `n` is the
//! 1-based position of its URL in the download batch. Product records only
//! know the remote URL, so everything here works in terms of the basename.

use std::sync::LazyLock;

use regex::Regex;

/// Vendor CDN layout: `/files/1/0689/1087/4891/files/<filename>` (or
/// `products` in either position). Only the trailing filename identifies
/// the asset.
static DEEP_STORAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:files|products)/(?:[^/?#]+/){4}(?:files|products)/([^/?#]+)(?:[?#]|$)")
        .expect("valid deep storage regex")
});

/// Splits a leading `<digits>-` index off a stored filename.
///
/// The prefix only counts when something remains after it, so `"12-"` is
/// an unprefixed name.
fn split_index_prefix(stored: &str) -> Option<(&str, &str)> {
    let digits_end = stored
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stored.len());
    if digits_end == 0 {
        return None;
    }
    let rest = stored[digits_end..].strip_prefix('-')?;
    if rest.is_empty() {
        return None;
    }
    Some((&stored[..digits_end], rest))
}

/// Returns `stored` with any leading `<digits>-` index removed.
#[must_use]
pub fn basename(stored: &str) -> &str {
    split_index_prefix(stored).map_or(stored, |(_, rest)| rest)
}

/// Returns `true` if `stored` carries a `<digits>-` download index.
#[must_use]
pub fn is_prefixed(stored: &str) -> bool {
    split_index_prefix(stored).is_some()
}

/// Returns the numeric download index of `stored`, if it has one.
///
/// Indices too large for `u64` sort last.
#[must_use]
pub fn index_prefix(stored: &str) -> Option<u64> {
    split_index_prefix(stored).map(|(digits, _)| digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// Extracts the filename that identifies an image from a product's image
/// reference.
///
/// 1. A reference under `asset_prefix` yields everything after the prefix.
/// 2. A vendor deep storage URL yields its trailing filename.
/// 3. Anything else yields the last path segment before any query string
///    or fragment.
///
/// Returns an empty string when the reference has no `/` at all or ends in
/// one. Never panics, whatever the input.
#[must_use]
pub fn extract_filename(url: &str, asset_prefix: &str) -> String {
    if !asset_prefix.is_empty() {
        if let Some(rest) = url.strip_prefix(asset_prefix) {
            return rest.to_string();
        }
    }

    if let Some(caps) = DEEP_STORAGE_RE.captures(url) {
        if let Some(name) = caps.get(1) {
            return name.as_str().to_string();
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rfind('/')
        .map(|idx| path[idx + 1..].to_string())
        .unwrap_or_default()
}

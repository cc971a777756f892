//! Index from image basenames to the files actually stored on disk.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ImageError;
use crate::filename::{basename, index_prefix, is_prefixed};

/// Maps `basename -> stored filename` for the downloaded asset directory.
///
/// Collision rule: an unprefixed filename always takes the slot, replacing
/// a prefixed one; a prefixed filename never replaces an existing entry.
/// Among prefixed duplicates the first one inserted wins, so callers that
/// want an order-independent result should feed names sorted by
/// [`list_asset_dir`].
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    entries: HashMap<String, String>,
}

impl AssetIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_filenames<I, S>(filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for name in filenames {
            index.insert(name.as_ref());
        }
        index
    }

    /// Adds one stored filename, applying the collision rule.
    pub fn insert(&mut self, stored: &str) {
        let key = basename(stored);
        if self.entries.contains_key(key) && is_prefixed(stored) {
            return;
        }
        self.entries.insert(key.to_string(), stored.to_string());
    }

    /// Exact lookup by basename.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Lookup by basename, retrying once with `.jpg` and `.png` swapped.
    ///
    /// That pair is the only substitution attempted.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        if let Some(found) = self.get(key) {
            return Some(found);
        }
        if let Some(stem) = key.strip_suffix(".jpg") {
            return self.get(&format!("{stem}.png"));
        }
        if let Some(stem) = key.strip_suffix(".png") {
            return self.get(&format!("{stem}.jpg"));
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lists the regular files in the asset directory, sorted by download index
/// (unprefixed names first) and then by name.
///
/// Directory iteration order differs between filesystems; sorting makes
/// the [`AssetIndex`] collision winner the lowest-indexed file everywhere.
///
/// # Errors
///
/// Returns [`ImageError::Io`] if the directory cannot be read.
pub fn list_asset_dir(dir: &Path) -> Result<Vec<String>, ImageError> {
    let io_err = |source| ImageError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                tracing::warn!(file = ?raw, "skipping asset with a non UTF-8 filename");
            }
        }
    }

    names.sort_by(|a, b| {
        index_prefix(a)
            .unwrap_or(0)
            .cmp(&index_prefix(b).unwrap_or(0))
            .then_with(|| a.cmp(b))
    });
    Ok(names)
}

//! Image identity for the spare-parts catalog: filename extraction, the
//! downloaded-asset index, build-time reconciliation, the runtime probe, and
//! the sequential downloader.

pub mod download;
pub mod error;
pub mod filename;
pub mod index;
pub mod probe;
pub mod reconcile;
mod retry;

pub use download::{unique_image_urls, DownloadSettings, DownloadSummary, ImageDownloader};
pub use error::ImageError;
pub use filename::{basename, extract_filename, index_prefix, is_prefixed};
pub use index::{list_asset_dir, AssetIndex};
pub use probe::{
    DirectoryLoader, HttpLoader, ImageProbe, ProbeOutcome, ProbeSettings, ProbeState,
};
pub use reconcile::{reconcile_records, Mismatch, ReconcileReport};

//! Spare-parts catalog: CSV import, category and brand facets, the JSON
//! catalog file, the SQL seed, the runtime catalog fetch, and the
//! storefront checkout bridge.

pub mod category;
pub mod checkout;
pub mod error;
pub mod facets;
pub mod import;
pub mod remote;
mod retry;
pub mod seed;
pub mod store;

pub use category::{display_category, subcategory_for_title, FALLBACK_CATEGORY};
pub use checkout::{numeric_id_from_gid, CheckoutTarget, ProductReference, StorefrontClient};
pub use error::CatalogError;
pub use facets::{FacetIndex, FacetSelection};
pub use import::{import_csv_file, import_products, ImportOptions, ImportOutput, ImportSummary};
pub use remote::CatalogClient;
pub use seed::{render_seed_sql, write_seed_sql};
pub use store::{load_catalog, save_catalog};

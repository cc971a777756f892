mod catalog;
mod checkout;
mod facets;
mod images;
mod import;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogCommands;
use crate::images::ImagesCommands;

#[derive(Debug, Parser)]
#[command(name = "nautic-cli")]
#[command(about = "Spare-parts catalog tooling for the Nautic site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import the storefront CSV export into the JSON catalog and SQL seed
    Import {
        /// Path to the product export
        #[arg(default_value = "products_export.csv")]
        csv: PathBuf,
        /// Only write the JSON catalog
        #[arg(long)]
        skip_seed: bool,
    },
    /// Download, reconcile and resolve product images
    Images {
        #[command(subcommand)]
        command: ImagesCommands,
    },
    /// List category and brand filters for the catalog
    Facets {
        /// Narrow brands to this display category
        #[arg(long)]
        category: Option<String>,
        /// Narrow categories to this brand
        #[arg(long)]
        brand: Option<String>,
        /// Also list products matching this search term
        #[arg(long)]
        search: Option<String>,
    },
    /// Work with the published catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Show how a product would be offered for sale
    Checkout {
        /// Storefront handle or numeric product id
        reference: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = nautic_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Import { csv, skip_seed }) => import::run_import(&config, &csv, skip_seed)?,
        Some(Commands::Images { command }) => images::run_images(&config, command).await?,
        Some(Commands::Facets {
            category,
            brand,
            search,
        }) => facets::run_facets(
            &config,
            category.as_deref(),
            brand.as_deref(),
            search.as_deref(),
        )?,
        Some(Commands::Catalog { command }) => catalog::run_catalog(&config, command).await?,
        Some(Commands::Checkout { reference }) => checkout::run_checkout(&config, &reference).await?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}

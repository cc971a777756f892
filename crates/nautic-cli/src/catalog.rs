//! `catalog` subcommands.

use clap::Subcommand;
use nautic_catalog::CatalogClient;
use nautic_core::AppConfig;

#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Fetch the published catalog; an unreachable catalog lists as empty
    Fetch {
        /// Catalog URL (defaults to NAUTIC_CATALOG_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

pub(crate) async fn run_catalog(config: &AppConfig, command: CatalogCommands) -> anyhow::Result<()> {
    match command {
        CatalogCommands::Fetch { url } => {
            let url = match url {
                Some(url) => url,
                None => config.require_catalog_url()?.to_owned(),
            };
            let client = CatalogClient::from_config(config)?;
            let products = client.fetch_catalog(&url).await;
            let in_stock = products.iter().filter(|p| p.in_stock).count();
            println!(
                "catalog fetch: products={} in_stock={}",
                products.len(),
                in_stock
            );
            Ok(())
        }
    }
}

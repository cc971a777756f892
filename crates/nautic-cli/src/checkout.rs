//! `checkout`: resolve a product to the buy widget or a product link.

use nautic_catalog::{CheckoutTarget, ProductReference, StorefrontClient};
use nautic_core::AppConfig;

pub(crate) async fn run_checkout(config: &AppConfig, reference: &str) -> anyhow::Result<()> {
    let client = StorefrontClient::from_config(config)?;
    match client.resolve(&ProductReference::parse(reference)).await {
        CheckoutTarget::Widget { product_id } => println!("widget: product_id={product_id}"),
        CheckoutTarget::Link { url } => println!("link: {url}"),
    }
    Ok(())
}

//! `facets`: the brand and category menu for the current catalog.

use nautic_catalog::{load_catalog, FacetIndex, FacetSelection};
use nautic_core::{load_brand_keywords, AppConfig, BrandKeywords};

fn brand_keywords(config: &AppConfig) -> anyhow::Result<BrandKeywords> {
    if config.brands_path.exists() {
        Ok(load_brand_keywords(&config.brands_path)?)
    } else {
        tracing::debug!(
            path = %config.brands_path.display(),
            "brands file not found, using built-in keyword list"
        );
        Ok(BrandKeywords::default())
    }
}

pub(crate) fn run_facets(
    config: &AppConfig,
    category: Option<&str>,
    brand: Option<&str>,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let products = load_catalog(&config.catalog_path)?;
    let keywords = brand_keywords(config)?;
    let index = FacetIndex::new(&products, &keywords);

    let mut selection = FacetSelection::default();
    if let Some(category) = category {
        selection.toggle_category(&index, category);
    }
    if let Some(brand) = brand {
        selection.toggle_brand(&index, brand);
    }

    println!("categories:");
    for c in index.categories_for_brand(selection.brand()) {
        let marker = if selection.category() == Some(c.as_str()) { "*" } else { " " };
        println!(" {marker} {c}");
    }
    println!("brands:");
    for b in index.brands_for_category(selection.category()) {
        let marker = if selection.brand() == Some(b.as_str()) { "*" } else { " " };
        println!(" {marker} {b}");
    }

    let matches = index.filter(&selection, search.unwrap_or_default());
    if search.is_some() || selection.active_count() > 0 {
        for product in &matches {
            println!("  {} {} ({})", product.id, product.name, product.price);
        }
    }
    println!(
        "facets: products={} matching={} active_filters={}",
        products.len(),
        matches.len(),
        selection.active_count()
    );
    Ok(())
}

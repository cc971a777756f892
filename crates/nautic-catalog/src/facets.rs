//! Brand and category filter facets over a loaded catalog.

use std::collections::BTreeSet;

use nautic_core::{BrandKeywords, ProductRecord};

use crate::category::display_category;

#[derive(Debug, Clone)]
struct ProductFacets {
    category: String,
    brands: Vec<String>,
}

/// Per-product display category and brands, computed once per catalog.
#[derive(Debug, Clone)]
pub struct FacetIndex<'a> {
    products: &'a [ProductRecord],
    facets: Vec<ProductFacets>,
}

impl<'a> FacetIndex<'a> {
    #[must_use]
    pub fn new(products: &'a [ProductRecord], keywords: &BrandKeywords) -> Self {
        let facets = products
            .iter()
            .map(|p| ProductFacets {
                category: display_category(&p.category).to_string(),
                brands: keywords.extract_brands(&p.name),
            })
            .collect();
        Self { products, facets }
    }

    /// Sorted, de-duplicated display categories.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        sorted_unique(self.facets.iter().map(|f| f.category.as_str()))
    }

    /// Sorted, de-duplicated brands across the whole catalog.
    #[must_use]
    pub fn all_brands(&self) -> Vec<String> {
        sorted_unique(self.facets.iter().flat_map(|f| f.brands.iter().map(String::as_str)))
    }

    /// Brands present in `category`, or every brand when `None`.
    #[must_use]
    pub fn brands_for_category(&self, category: Option<&str>) -> Vec<String> {
        let Some(category) = category else {
            return self.all_brands();
        };
        sorted_unique(
            self.facets
                .iter()
                .filter(|f| f.category == category)
                .flat_map(|f| f.brands.iter().map(String::as_str)),
        )
    }

    /// Categories containing `brand`, or every category when `None`.
    #[must_use]
    pub fn categories_for_brand(&self, brand: Option<&str>) -> Vec<String> {
        let Some(brand) = brand else {
            return self.categories();
        };
        sorted_unique(
            self.facets
                .iter()
                .filter(|f| f.brands.iter().any(|b| b == brand))
                .map(|f| f.category.as_str()),
        )
    }

    /// Products matching the selection and a case-insensitive search term
    /// over name, description and display category. An empty term matches
    /// everything.
    #[must_use]
    pub fn filter(&self, selection: &FacetSelection, search: &str) -> Vec<&'a ProductRecord> {
        let needle = search.to_lowercase();
        self.products
            .iter()
            .zip(&self.facets)
            .filter(|(_, f)| selection.category().is_none_or(|c| f.category == c))
            .filter(|(_, f)| selection.brand().is_none_or(|b| f.brands.iter().any(|x| x == b)))
            .filter(|(p, f)| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || f.category.to_lowercase().contains(&needle)
            })
            .map(|(p, _)| p)
            .collect()
    }
}

fn sorted_unique<'s>(values: impl Iterator<Item = &'s str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// The menu's current category and brand choice.
///
/// Selecting the current value again clears it. After either facet changes,
/// a selection on the other facet that no longer has any products is
/// cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    category: Option<String>,
    brand: Option<String>,
}

impl FacetSelection {
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Number of active facets, as shown on the menu badge.
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(self.category.is_some()) + usize::from(self.brand.is_some())
    }

    pub fn toggle_category(&mut self, index: &FacetIndex<'_>, category: &str) {
        toggle(&mut self.category, category);
        if let (Some(selected), Some(brand)) = (self.category.as_deref(), self.brand.as_deref()) {
            if !index.brands_for_category(Some(selected)).iter().any(|b| b == brand) {
                self.brand = None;
            }
        }
    }

    pub fn toggle_brand(&mut self, index: &FacetIndex<'_>, brand: &str) {
        toggle(&mut self.brand, brand);
        if let (Some(selected), Some(category)) = (self.brand.as_deref(), self.category.as_deref()) {
            if !index.categories_for_brand(Some(selected)).iter().any(|c| c == category) {
                self.category = None;
            }
        }
    }

    pub fn reset(&mut self) {
        self.category = None;
        self.brand = None;
    }
}

fn toggle(slot: &mut Option<String>, value: &str) {
    if slot.as_deref() == Some(value) {
        *slot = None;
    } else {
        *slot = Some(value.to_owned());
    }
}

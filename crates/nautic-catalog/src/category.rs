//! Category labels: the import-time classifier and the display form.

/// Label for products with no recognisable category.
pub const FALLBACK_CATEGORY: &str = "Altri";

const NAMESPACE_PREFIX: &str = "Ricambi - ";
const BARE_NAMESPACE: &str = "Ricambi";

/// First matching rule wins; needles are lower-case substrings.
const SUBCATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["elica", "propeller"], "Eliche"),
    (&["motore", "motor"], "Motore"),
    (&["candela", "spark plug"], "Candele"),
    (&["filtro"], "Filtri"),
    (&["pompa"], "Pompe"),
    (&["sensore"], "Sensori"),
    (&["guarnizione"], "Guarnizioni"),
    (&["kit"], "Kit"),
    (&["carburatore", "carburator"], "Carburatori"),
];

/// Assigns a sub-category from keywords in a product title.
#[must_use]
pub fn subcategory_for_title(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    SUBCATEGORY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map_or(FALLBACK_CATEGORY, |(_, label)| label)
}

/// Display form of a stored category: strips the `"Ricambi - "` namespace
/// and maps the bare namespace or an empty label to [`FALLBACK_CATEGORY`].
#[must_use]
pub fn display_category(raw: &str) -> &str {
    let label = raw.strip_prefix(NAMESPACE_PREFIX).unwrap_or(raw);
    if label.is_empty() || label == BARE_NAMESPACE {
        FALLBACK_CATEGORY
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strips_namespace() {
        assert_eq!(display_category("Ricambi - Motore"), "Motore");
        assert_eq!(display_category("Ricambi"), "Altri");
        assert_eq!(display_category(""), "Altri");
        assert_eq!(display_category("Ricambi - "), "Altri");
        assert_eq!(display_category("Filtri"), "Filtri");
    }

    #[test]
    fn display_only_strips_a_leading_namespace() {
        assert_eq!(display_category("Kit Ricambi - Motore"), "Kit Ricambi - Motore");
    }

    #[test]
    fn classifier_is_case_insensitive() {
        assert_eq!(subcategory_for_title("ELICA Solas 3 pale"), "Eliche");
        assert_eq!(subcategory_for_title("Filtro olio YAMAHA"), "Filtri");
        assert_eq!(subcategory_for_title("NGK Spark Plug BR6HS"), "Candele");
    }

    #[test]
    fn first_rule_wins() {
        // "motor" is tested before "filtro".
        assert_eq!(subcategory_for_title("Filtro carburante motore"), "Motore");
        // "carburatore" contains no earlier needle.
        assert_eq!(subcategory_for_title("Carburatore Tohatsu"), "Carburatori");
        assert_eq!(subcategory_for_title("Kit guarnizione pompa"), "Pompe");
    }

    #[test]
    fn unmatched_title_falls_back() {
        assert_eq!(subcategory_for_title("Grasso marino"), FALLBACK_CATEGORY);
        assert_eq!(subcategory_for_title(""), FALLBACK_CATEGORY);
    }
}

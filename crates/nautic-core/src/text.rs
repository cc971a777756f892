//! Plain-text cleaning for product descriptions exported as HTML.

/// Entities decoded by [`strip_markup`]. Anything else is left verbatim.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#x2019;", "'"),
    ("&#x201C;", "\""),
    ("&#x201D;", "\""),
    ("&#x201E;", "\""),
    ("&#x201A;", ","),
    ("&#x2013;", "-"),
    ("&#x2014;", "-"),
    ("&#x2022;", "-"),
    ("&#x2026;", "..."),
    ("&#xFEFF;", ""),
];

/// Strips tags, decodes the entity whitelist, collapses whitespace and trims.
///
/// Cleaning is repeated until the text stops changing, so double-escaped
/// input such as `&amp;nbsp;` resolves fully and
/// `strip_markup(&strip_markup(x)) == strip_markup(x)` holds for every input.
/// Each pass that changes the text makes it strictly shorter, which bounds
/// the loop.
#[must_use]
pub fn strip_markup(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(raw: &str) -> String {
    let decoded = decode_entities(&remove_tags(raw));
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes every `<...>` span. An unterminated `<` is kept as text.
fn remove_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        if let Some((entity, replacement)) =
            ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity))
        {
            out.push_str(replacement);
            rest = &tail[entity.len()..];
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Caps `text` at `max_chars` characters, replacing the overflow with `"..."`.
///
/// Counts characters rather than bytes so accented Italian text is never cut
/// mid-codepoint.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<p>Filtro   olio</p>\n<ul><li>Originale</li></ul>";
        assert_eq!(strip_markup(html), "Filtro olio Originale");
    }

    #[test]
    fn decodes_whitelisted_entities() {
        let html = "Tom&amp;Jerry&nbsp;&quot;12V&quot; &#x2013; l&#x2019;elica&#x2026;";
        assert_eq!(strip_markup(html), "Tom&Jerry \"12V\" - l'elica...");
    }

    #[test]
    fn removes_byte_order_mark_entity() {
        assert_eq!(strip_markup("&#xFEFF;Guarnizione"), "Guarnizione");
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(strip_markup("5 &lt; 6 &euro;"), "5 &lt; 6 &euro;");
    }

    #[test]
    fn unterminated_tag_is_kept_as_text() {
        assert_eq!(strip_markup("pressione < 2 bar"), "pressione < 2 bar");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(strip_markup(""), "");
        assert_eq!(strip_markup("   <br/>  "), "");
    }

    #[test]
    fn double_escaped_entities_resolve_fully() {
        assert_eq!(strip_markup("a&amp;nbsp;b"), "a b");
    }

    #[test]
    fn is_idempotent_on_awkward_inputs() {
        let inputs = [
            "<b>Pompa</b> &amp;amp; girante",
            "&#xFEF&#xFEFF;F; leftover",
            "<<b>>nested<</b>>",
            "&amp;&#x2026;&nbsp;&nbsp; end ",
            "plain text",
        ];
        for input in inputs {
            let once = strip_markup(input);
            assert_eq!(strip_markup(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_with_ellipsis("Kit tagliando", 1000), "Kit tagliando");
    }

    #[test]
    fn truncate_caps_at_max_chars_including_ellipsis() {
        let long = "è".repeat(1200);
        let out = truncate_with_ellipsis(&long, 1000);
        assert_eq!(out.chars().count(), 1000);
        assert!(out.ends_with("..."));
    }
}

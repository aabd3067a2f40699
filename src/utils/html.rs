//! HTML markup neutralization for free-text profile fields.

/// Neutralize markup by entity-escaping `&`, `<` and `>`.
///
/// Applied before validation, so length limits are enforced on the filtered
/// text that would actually be stored. Quotes pass through untouched: the
/// socialLinks field stores serialized JSON and must survive filtering
/// intact.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_markup("Hangzhou, China"), "Hangzhou, China");
        assert_eq!(strip_markup(""), "");
    }

    #[test]
    fn tags_are_neutralized() {
        assert_eq!(
            strip_markup("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn serialized_json_survives_filtering() {
        let json = r#"{"github":"alice","blog":"https://alice.dev"}"#;
        assert_eq!(strip_markup(json), json);
    }

    #[test]
    fn ampersand_is_escaped_once() {
        // Already-escaped input is escaped again rather than left alone;
        // the filter is applied to raw user input exactly once.
        assert_eq!(strip_markup("&lt;"), "&amp;lt;");
    }
}

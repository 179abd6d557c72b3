use ammonia::{Builder, UrlRelative};

/// Sanitizes rich-text HTML from the admin editor to remove scripts, event
/// handlers and other unsafe markup. Formatting tags survive.
pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::Deny)
        .clean(content)
        .to_string()
}

/// True when the fragment has no visible text once tags are stripped,
/// e.g. the `<p><br></p>` an empty editor submits.
pub fn is_blank_html(content: &str) -> bool {
    Builder::empty()
        .clean(content)
        .to_string()
        .replace("&nbsp;", " ")
        .trim()
        .is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_but_keeps_formatting() {
        let cleaned = sanitize_html(r#"<p onclick="x()">Hi <strong>there</strong><script>alert(1)</script></p>"#);
        assert_eq!(cleaned, "<p>Hi <strong>there</strong></p>");
    }

    #[test]
    fn detects_empty_editor_output() {
        assert!(is_blank_html("<p><br></p>"));
        assert!(is_blank_html("  "));
        assert!(!is_blank_html("<p>Rust developer</p>"));
    }
}

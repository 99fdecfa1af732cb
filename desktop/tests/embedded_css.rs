#![cfg(test)]
//! Ensures the embedded desktop CSS (shared dashboard theme) stays present and non-trivial.
//!
//! The desktop build inlines `ui/assets/theme/main.css` through `ui::THEME_CSS`; a
//! truncated or moved file would otherwise only show up as an unstyled window.

const EMBEDDED_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[test]
fn embedded_css_file_exists_and_is_not_empty() {
    assert!(
        !EMBEDDED_CSS.trim().is_empty(),
        "Embedded CSS file appears to be empty."
    );
}

#[test]
fn embedded_css_matches_the_ui_constant() {
    assert_eq!(EMBEDDED_CSS, ui::THEME_CSS);
}

#[test]
fn embedded_css_contains_expected_tokens() {
    let required = ["--color-bg", ".stat-card", "body {", ".button--primary"];
    for token in required {
        assert!(
            EMBEDDED_CSS.contains(token),
            "Expected token `{token}` missing from embedded CSS"
        );
    }
}

//! Localization for the dashboard chrome.
//!
//! Built on `i18n-embed` (language selection and loading), `fluent` (message
//! formatting), `rust-embed` (the `.ftl` files are compiled in) and
//! `i18n-embed-fl` (the compile-time checked `fl!` macro).
//!
//! ```text
//! i18n.toml
//! i18n/
//!   fr-FR/vidboard-ui.ftl   (fallback, the operators' language)
//!   en-US/vidboard-ui.ftl
//! ```
//!
//! Column headers of the table and of exported files are not localized; they
//! are part of the export format (see `core::records::ChoiceField::label`).
//!
//! ```ignore
//! ui::i18n::init();
//! let title = ui::t!("app-title");
//! let rows = ui::t!("table-record-count", count = "12");
//! ```
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::LanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::warn;
use unic_langid::{langid, LanguageIdentifier};

pub use i18n_embed_fl::fl;

/// Translation macro routing every lookup through [`LOADER`].
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fluent domain; also the `.ftl` filename in every locale folder.
const DOMAIN: &str = "vidboard-ui";

pub const FALLBACK_LANGUAGE: LanguageIdentifier = langid!("fr-FR");

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let loader = FluentLanguageLoader::new(DOMAIN, FALLBACK_LANGUAGE);
    // Bidi isolation marks would end up inside numbers and machine names.
    loader.set_use_isolating(false);
    loader
});

static INIT: Once = Once::new();

/// Loads the bundles for the user's preferred languages. Idempotent.
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        if let Err(err) = i18n_embed::select(&*LOADER, &Localizations, &requested) {
            warn!(%err, "failed selecting languages; continuing with fallback");
        }
    });
}

/// Switches language at runtime. Unparseable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let lang: LanguageIdentifier = match tag.parse() {
        Ok(lang) => lang,
        Err(_) => return Ok(()),
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// Language tags with an embedded bundle, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(str::to_string))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

/// Tag of the language currently in use.
pub fn current_language() -> String {
    LOADER.current_language().to_string()
}

/// Lookup for keys only known at runtime, e.g. [`DayWindow::label_key`].
///
/// [`DayWindow::label_key`]: crate::dashboard::DayWindow::label_key
pub fn tr(key: &str) -> String {
    LOADER.get(key)
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_language_is_present() {
        assert!(available_languages().iter().any(|l| l == "fr-FR"));
        assert!(available_languages().iter().any(|l| l == "en-US"));
    }

    #[test]
    fn basic_lookup_works() {
        init();
        assert_eq!(fl!(&*LOADER, "app-title"), "Video Analytics Dashboard");
    }

    #[test]
    fn window_labels_resolve() {
        init();
        for window in crate::dashboard::DayWindow::ALL {
            let label = tr(window.label_key());
            assert!(!label.is_empty());
            assert_ne!(label, window.label_key());
        }
    }

    #[test]
    fn current_language_has_a_bundle() {
        init();
        assert!(available_languages().contains(&current_language()));
    }

    #[test]
    fn arguments_are_substituted_without_isolation_marks() {
        init();
        let _ = set_language("fr-FR");
        let line = crate::t!("export-working", format = "XLSX".to_string());
        assert_eq!(line, "Préparation de l'export XLSX…");
    }

    #[test]
    fn unknown_language_keeps_current_bundle() {
        init();
        let before = fl!(&*LOADER, "app-title");
        let _ = set_language("zz-ZZ");
        assert_eq!(fl!(&*LOADER, "app-title"), before);
    }
}

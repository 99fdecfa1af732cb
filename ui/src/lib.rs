//! Shared UI crate for the kiosk analytics dashboard. Records, projections,
//! export codecs and every view live here; the launchers only add routing.

pub mod core;
pub mod dashboard;
pub mod i18n;
pub mod views;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::AppNavbar;
}

/// Shared theme, embedded so launchers never depend on a separate asset file.
pub const THEME_CSS: &str = include_str!("../assets/theme/main.css");

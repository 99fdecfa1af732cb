//! Dashboard configuration.
//!
//! Defaults can be overridden at build time with `VIDBOARD_API_URL` (the only
//! option for the wasm bundle), and on native builds at runtime through the
//! `VIDBOARD_API_URL` and `VIDBOARD_CHOICES_LIMIT` environment variables.

use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Base filename for exports; the format adds `.csv` / `.xlsx`.
pub const DEFAULT_EXPORT_BASENAME: &str = "video_analytics";

/// The backend refuses pages larger than this.
pub const MAX_CHOICES_LIMIT: u32 = 1000;

const API_URL_VAR: &str = "VIDBOARD_API_URL";
const CHOICES_LIMIT_VAR: &str = "VIDBOARD_CHOICES_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub export_basename: String,
    pub choices_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("VIDBOARD_API_URL")
                .unwrap_or(DEFAULT_API_URL)
                .to_string(),
            export_basename: DEFAULT_EXPORT_BASENAME.to_string(),
            choices_limit: MAX_CHOICES_LIMIT,
        }
    }
}

impl DashboardConfig {
    /// Defaults plus whatever the process environment overrides.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut config = Self::default();

        #[cfg(not(target_arch = "wasm32"))]
        config.apply_overrides(|key| std::env::var(key).ok());

        config
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_VAR).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(CHOICES_LIMIT_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(limit) => self.choices_limit = limit.clamp(1, MAX_CHOICES_LIMIT),
                Err(_) => warn!(value = %raw, "ignoring invalid {CHOICES_LIMIT_VAR}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_backend() {
        let config = DashboardConfig::default();
        assert_eq!(config.export_basename, "video_analytics");
        assert_eq!(config.choices_limit, 1000);
        assert!(!config.api_base_url.is_empty());
    }

    #[test]
    fn overrides_apply() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(lookup(&[
            ("VIDBOARD_API_URL", " http://analytics.local:9000 "),
            ("VIDBOARD_CHOICES_LIMIT", "250"),
        ]));
        assert_eq!(config.api_base_url, "http://analytics.local:9000");
        assert_eq!(config.choices_limit, 250);
    }

    #[test]
    fn limit_is_clamped_and_garbage_ignored() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(lookup(&[("VIDBOARD_CHOICES_LIMIT", "50000")]));
        assert_eq!(config.choices_limit, MAX_CHOICES_LIMIT);

        config.apply_overrides(lookup(&[("VIDBOARD_CHOICES_LIMIT", "lots")]));
        assert_eq!(config.choices_limit, MAX_CHOICES_LIMIT);

        config.apply_overrides(lookup(&[("VIDBOARD_API_URL", "   ")]));
        assert_eq!(config.api_base_url, DashboardConfig::default().api_base_url);
    }
}

use api::ApiClient;
use dioxus::prelude::*;
use tracing::error;

use crate::core::config::DashboardConfig;
use crate::dashboard::{
    use_dashboard, ChartsGrid, ChoicesTable, DashboardFilters, DashboardHandle, Fetch, StatsCards,
};
use crate::t;

/// The whole analytics page: filters, summary cards, charts and the table.
#[component]
pub fn Dashboard() -> Element {
    // Re-render on language change when the launcher provides the signal.
    let _lang = try_use_context::<Signal<String>>().map(|code| code());

    let config = use_hook(|| {
        try_consume_context::<DashboardConfig>().unwrap_or_else(DashboardConfig::from_env)
    });
    use_context_provider(|| config.clone());

    let client = use_hook(|| {
        ApiClient::new(&config.api_base_url).map_err(|err| {
            error!(%err, "backend URL rejected; the dashboard will stay empty");
            err.to_string()
        })
    });
    let dashboard = use_dashboard(client, config.choices_limit);
    use_context_provider(|| dashboard);

    rsx! {
        main { class: "page dashboard",
            LoadBanner {}
            DashboardFilters {}
            StatsCards {}
            ChartsGrid {}
            ChoicesTable {}
            footer { class: "dashboard__footer", {t!("app-footer")} }
        }
    }
}

/// Shown when the backend could not be reached; panels render their own empty state.
#[component]
fn LoadBanner() -> Element {
    let dashboard = use_context::<DashboardHandle>();
    let reason = match dashboard.state.read().stats() {
        Fetch::Failed(reason) => Some(reason.clone()),
        _ => None,
    };

    rsx! {
        if let Some(reason) = reason {
            div { class: "banner banner--error", role: "alert",
                {t!("load-error-banner", reason = reason)}
            }
        }
    }
}

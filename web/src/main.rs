use dioxus::prelude::*;

use ui::components::AppNavbar;
use ui::core::config::DashboardConfig;
use ui::views::Dashboard;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Dashboard {},
}

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    // The API URL is baked in at build time for the browser bundle.
    use_context_provider(DashboardConfig::default);
    let lang_code = use_signal(ui::i18n::current_language);
    use_context_provider(|| lang_code);

    rsx! {
        document::Style { "{ui::THEME_CSS}" }

        div {
            key: "{lang_code()}",
            Router::<Route> {}
        }
    }
}

/// A web-specific layout around the shared `AppNavbar` component
/// which allows us to use the web-specific `Route` enum.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar {}
        Outlet::<Route> {}
    }
}

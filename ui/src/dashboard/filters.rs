use dioxus::prelude::*;

use super::{DashboardEvent, DashboardHandle, DayWindow};
use crate::core::format::machine_option_label;
use crate::i18n;
use crate::t;

/// Machine and period selectors.
#[component]
pub fn DashboardFilters() -> Element {
    let dashboard = use_context::<DashboardHandle>();

    let filter = dashboard.state.read().filter().clone();
    let machines = dashboard
        .state
        .read()
        .machines()
        .ready()
        .cloned()
        .unwrap_or_default();
    let busy = dashboard.state.read().stats().is_loading();

    let on_machine = move |evt: FormEvent| {
        dashboard.send(DashboardEvent::SelectMachine(evt.value()));
    };

    let on_window = move |evt: FormEvent| {
        match evt.value().parse::<u16>().ok().and_then(DayWindow::from_days) {
            Some(window) => dashboard.send(DashboardEvent::SelectWindow(window)),
            None => tracing::warn!(value = %evt.value(), "unknown period option"),
        }
    };

    let selected_days = filter.window.days().to_string();

    rsx! {
        section { class: "dashboard-filters card",
            div { class: "dashboard-filters__field",
                label { r#for: "machine-filter", {t!("filter-machine-label")} }
                select {
                    id: "machine-filter",
                    value: "{filter.machine}",
                    onchange: on_machine,
                    option { value: "", selected: filter.machine.is_empty(), {t!("filter-machine-all")} }
                    for machine in machines {
                        option {
                            key: "{machine.id}",
                            value: "{machine.name}",
                            selected: machine.name == filter.machine,
                            {machine_option_label(&machine)}
                        }
                    }
                }
            }

            div { class: "dashboard-filters__field",
                label { r#for: "window-filter", {t!("filter-window-label")} }
                select {
                    id: "window-filter",
                    value: "{selected_days}",
                    onchange: on_window,
                    for window in DayWindow::ALL {
                        option {
                            key: "{window.days()}",
                            value: "{window.days()}",
                            selected: window == filter.window,
                            {i18n::tr(window.label_key())}
                        }
                    }
                }
            }

            button {
                r#type: "button",
                class: "button button--ghost dashboard-filters__refresh",
                disabled: busy,
                onclick: move |_| dashboard.send(DashboardEvent::Refresh),
                {t!("filter-refresh")}
            }
        }
    }
}

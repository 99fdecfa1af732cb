use dioxus::prelude::*;

use super::{DashboardHandle, Fetch};
use crate::core::metrics::{card_values, CardValues};
use crate::t;

#[component]
pub fn StatsCards() -> Element {
    let dashboard = use_context::<DashboardHandle>();
    let cards = use_memo(move || dashboard.state.read().stats().project(card_values));

    let content = match cards() {
        Fetch::Ready(values) => rsx! { CardRow { values } },
        Fetch::Failed(_) => rsx! {
            div { class: "stat-card stat-card--empty", {t!("panel-no-data")} }
        },
        Fetch::Idle | Fetch::Loading => rsx! {
            for index in 0..4 {
                div { key: "{index}", class: "stat-card stat-card--placeholder", aria_busy: "true" }
            }
        },
    };

    rsx! {
        section { class: "stat-cards", {content} }
    }
}

#[component]
fn CardRow(values: CardValues) -> Element {
    rsx! {
        StatCard { label: t!("card-total-choices"), value: values.total_choices, accent: "blue" }
        StatCard { label: t!("card-active-machines"), value: values.active_machines, accent: "green" }
        StatCard { label: t!("card-top-button"), value: values.top_button, accent: "amber" }
        StatCard { label: t!("card-registered-machines"), value: values.registered_machines, accent: "violet" }
    }
}

#[component]
fn StatCard(label: String, value: String, accent: &'static str) -> Element {
    rsx! {
        div { class: "stat-card stat-card--{accent}",
            p { class: "stat-card__label", "{label}" }
            p { class: "stat-card__value", "{value}" }
        }
    }
}

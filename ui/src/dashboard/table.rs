use dioxus::prelude::*;

use super::{DashboardEvent, DashboardHandle, ExportPanel, Fetch};
use crate::core::format::{format_count, format_event_time, video_basename};
use crate::core::platform;
use crate::core::records::{Choice, ChoiceField};
use crate::core::sort::SortState;
use crate::t;

const PLACEHOLDER_ROWS: usize = 5;

/// The loaded page of choices in display order, with the backend total.
#[derive(Debug, Clone, PartialEq)]
struct TableModel {
    total: u64,
    rows: Vec<Choice>,
}

#[component]
pub fn ChoicesTable() -> Element {
    let dashboard = use_context::<DashboardHandle>();

    let sort = use_memo(move || dashboard.state.read().sort());
    let model = use_memo(move || {
        let state = dashboard.state.read();
        let sort = state.sort();
        state.choices().project(|page| TableModel {
            total: page.total,
            rows: sort.apply(&page.choices),
        })
    });

    let columns = ChoiceField::ALL.len();
    let count_label = match model() {
        Fetch::Ready(ref table) => t!("table-record-count", count = format_count(table.total)),
        _ => String::new(),
    };

    let body = match model() {
        Fetch::Ready(table) if table.rows.is_empty() => rsx! {
            tr { class: "choices-table__empty",
                td { colspan: "{columns}", {t!("table-empty")} }
            }
        },
        Fetch::Ready(table) => rsx! {
            for choice in table.rows {
                ChoiceRow { key: "{choice.id}", choice }
            }
        },
        Fetch::Failed(_) => rsx! {
            tr { class: "choices-table__empty",
                td { colspan: "{columns}", {t!("table-empty")} }
            }
        },
        Fetch::Idle | Fetch::Loading => rsx! {
            for index in 0..PLACEHOLDER_ROWS {
                tr { key: "{index}", class: "choices-table__placeholder", aria_busy: "true",
                    for field in ChoiceField::ALL {
                        td { key: "{field.label()}", span { class: "skeleton" } }
                    }
                }
            }
        },
    };

    rsx! {
        section { class: "card choices",
            div { class: "choices__header",
                div {
                    h2 { class: "choices__title", {t!("table-title")} }
                    p { class: "choices__count", "{count_label}" }
                }
                ExportPanel {}
            }
            div { class: "choices__scroll",
                table { class: "choices-table",
                    thead {
                        tr {
                            for field in ChoiceField::ALL {
                                SortHeader { key: "{field.label()}", field, sort: sort() }
                            }
                        }
                    }
                    tbody { {body} }
                }
            }
        }
    }
}

#[component]
fn SortHeader(field: ChoiceField, sort: SortState) -> Element {
    let dashboard = use_context::<DashboardHandle>();
    let active = sort.field == field;

    rsx! {
        th {
            scope: "col",
            aria_sort: sort.aria_sort(field),
            class: if active { "choices-table__head choices-table__head--active" } else { "choices-table__head" },
            button {
                r#type: "button",
                class: "choices-table__sort",
                onclick: move |_| dashboard.send(DashboardEvent::ToggleSort(field)),
                "{field.label()}"
                span { class: "choices-table__indicator", aria_hidden: "true", "{sort.indicator(field)}" }
            }
        }
    }
}

#[component]
fn ChoiceRow(choice: Choice) -> Element {
    let when = format_event_time(choice.event_time, platform::local_offset())
        .unwrap_or_else(|_| "—".to_string());
    let video = video_basename(&choice.video).to_string();

    rsx! {
        tr {
            td { class: "choices-table__id", "{choice.id}" }
            td { span { class: "badge", "{choice.choix}" } }
            td { "{choice.machine}" }
            td { class: "choices-table__video", title: "{choice.video}", "{video}" }
            td { class: "choices-table__time", "{when}" }
        }
    }
}

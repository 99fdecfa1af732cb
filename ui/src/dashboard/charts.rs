use dioxus::prelude::*;

use super::{DashboardHandle, Fetch};
use crate::core::metrics::{
    button_bars, daily_series, machine_bars, palette_color, share_gradient, share_slices,
    show_machine_chart, Bar, DailySeries, ShareSlice,
};
use crate::core::records::Stats;
use crate::t;

const DAILY_WIDTH: f64 = 600.0;
const DAILY_HEIGHT: f64 = 180.0;

/// Everything the four charts draw, derived once per `Stats` snapshot.
#[derive(Debug, Clone, PartialEq)]
struct ChartsModel {
    buttons: Vec<Bar>,
    slices: Vec<ShareSlice>,
    gradient: Option<String>,
    daily: DailySeries,
    machines: Option<Vec<Bar>>,
}

impl ChartsModel {
    fn from_stats(stats: &Stats) -> Self {
        let slices = share_slices(stats);
        Self {
            buttons: button_bars(stats),
            gradient: share_gradient(&slices),
            slices,
            daily: daily_series(stats, DAILY_WIDTH, DAILY_HEIGHT),
            machines: show_machine_chart(stats).then(|| machine_bars(stats)),
        }
    }
}

#[component]
pub fn ChartsGrid() -> Element {
    let dashboard = use_context::<DashboardHandle>();
    let model = use_memo(move || dashboard.state.read().stats().project(ChartsModel::from_stats));

    let model = match model() {
        Fetch::Ready(model) => model,
        Fetch::Failed(_) => {
            return rsx! {
                section { class: "charts-grid",
                    div { class: "chart-card chart-card--empty", {t!("panel-no-data")} }
                }
            }
        }
        Fetch::Idle | Fetch::Loading => {
            return rsx! {
                section { class: "charts-grid",
                    for index in 0..2 {
                        div { key: "{index}", class: "chart-card chart-card--placeholder", aria_busy: "true" }
                    }
                }
            }
        }
    };

    rsx! {
        section { class: "charts-grid",
            ChartCard { title: t!("chart-button-count"),
                BarList { bars: model.buttons.clone(), vertical: true }
            }
            ChartCard { title: t!("chart-button-share"),
                SharePie { slices: model.slices.clone(), gradient: model.gradient.clone() }
            }
            ChartCard { title: t!("chart-daily-activity"),
                DailyLine { series: model.daily.clone() }
            }
            if let Some(machines) = model.machines.clone() {
                ChartCard { title: t!("chart-machine-activity"),
                    BarList { bars: machines, vertical: false }
                }
            }
        }
    }
}

#[component]
fn ChartCard(title: String, children: Element) -> Element {
    rsx! {
        div { class: "chart-card",
            h3 { class: "chart-card__title", "{title}" }
            {children}
        }
    }
}

#[component]
fn BarList(bars: Vec<Bar>, vertical: bool) -> Element {
    if bars.is_empty() {
        return rsx! { p { class: "chart-card__empty", {t!("panel-no-data")} } };
    }

    let orientation = if vertical { "bars--vertical" } else { "bars--horizontal" };
    let dimension = if vertical { "height" } else { "width" };

    rsx! {
        div { class: "bars {orientation}",
            for (index, bar) in bars.into_iter().enumerate() {
                div { key: "{bar.label}", class: "bars__item", title: "{bar.label}: {bar.value_label}",
                    span { class: "bars__label", "{bar.label}" }
                    div { class: "bars__track",
                        div {
                            class: "bars__fill",
                            style: format!("{dimension}: {:.1}%; background: {};", bar.extent, palette_color(index)),
                        }
                    }
                    span { class: "bars__value", "{bar.value_label}" }
                }
            }
        }
    }
}

#[component]
fn SharePie(slices: Vec<ShareSlice>, gradient: Option<String>) -> Element {
    let Some(gradient) = gradient else {
        return rsx! { p { class: "chart-card__empty", {t!("panel-no-data")} } };
    };

    rsx! {
        div { class: "pie",
            div { class: "pie__disc", role: "img", style: "background: {gradient};" }
            ul { class: "pie__legend",
                for slice in slices {
                    li { key: "{slice.label}", class: "pie__legend-item",
                        span { class: "pie__swatch", style: "background: {slice.color};" }
                        "{slice.label}"
                    }
                }
            }
        }
    }
}

#[component]
fn DailyLine(series: DailySeries) -> Element {
    if series.points.is_empty() {
        return rsx! { p { class: "chart-card__empty", {t!("panel-no-data")} } };
    }

    let points = series.polyline();
    let view_box = format!("-10 -10 {} {}", DAILY_WIDTH + 20.0, DAILY_HEIGHT + 40.0);
    let tick_y = DAILY_HEIGHT + 24.0;
    // Roughly eight labels whatever the window length.
    let tick_every = (series.points.len() / 8).max(1);

    rsx! {
        svg {
            class: "daily-line",
            view_box: "{view_box}",
            preserve_aspect_ratio: "none",
            polyline {
                class: "daily-line__path",
                points: "{points}",
                fill: "none",
                stroke: palette_color(0),
                stroke_width: "2",
            }
            for (index, point) in series.points.iter().enumerate() {
                g { key: "{index}",
                    circle {
                        class: "daily-line__dot",
                        cx: "{point.x}",
                        cy: "{point.y}",
                        r: "3",
                        fill: palette_color(0),
                        title { "{point.tooltip}" }
                    }
                    if index % tick_every == 0 {
                        text {
                            class: "daily-line__tick",
                            x: "{point.x}",
                            y: "{tick_y}",
                            text_anchor: "middle",
                            "{point.tick}"
                        }
                    }
                }
            }
        }
    }
}

//! Derived metrics for the summary cards and chart legends.
//!
//! Everything here is a pure function of a `Stats` snapshot. Percentages are
//! taken verbatim from the backend; nothing is re-derived client-side except
//! bar widths and pie angles, which are purely geometric.

use super::format::{format_count, format_day, format_day_tick, format_percentage};
use super::records::{MachineActivity, Stats};

/// Series colours, cycled by position.
pub const PALETTE: [&str; 7] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#06B6D4",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopButton {
    pub choix: String,
    pub percentage: f64,
}

/// Most popular button: the first entry, since the backend orders by count.
pub fn top_button(stats: &Stats) -> Option<TopButton> {
    stats.choices_by_button.first().map(|share| TopButton {
        choix: share.choix.clone(),
        percentage: share.percentage,
    })
}

/// Machines with at least one choice in the window.
pub fn active_machine_count(stats: &Stats) -> usize {
    stats.choices_by_machine.len()
}

/// Display strings for the four summary cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardValues {
    pub total_choices: String,
    pub active_machines: String,
    pub top_button: String,
    pub registered_machines: String,
}

pub fn card_values(stats: &Stats) -> CardValues {
    CardValues {
        total_choices: format_count(stats.total_choices),
        active_machines: active_machine_count(stats).to_string(),
        top_button: top_button(stats)
            .map(|top| format!("{} ({}%)", top.choix, format_percentage(top.percentage)))
            .unwrap_or_else(|| "-".to_string()),
        registered_machines: stats.total_machines.to_string(),
    }
}

/// One bar of a horizontal or vertical bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
    pub value_label: String,
    /// Length relative to the largest bar, in percent.
    pub extent: f64,
}

fn bars<'a>(entries: impl Iterator<Item = (&'a str, u64)> + Clone) -> Vec<Bar> {
    let max = entries.clone().map(|(_, value)| value).max().unwrap_or(0);
    entries
        .map(|(label, value)| Bar {
            label: label.to_string(),
            value,
            value_label: format_count(value),
            extent: if max == 0 {
                0.0
            } else {
                value as f64 * 100.0 / max as f64
            },
        })
        .collect()
}

pub fn button_bars(stats: &Stats) -> Vec<Bar> {
    bars(
        stats
            .choices_by_button
            .iter()
            .map(|share| (share.choix.as_str(), share.count)),
    )
}

/// Per-machine activity, busiest first. The backend order is not relied upon.
pub fn machine_bars(stats: &Stats) -> Vec<Bar> {
    let mut machines: Vec<&MachineActivity> = stats.choices_by_machine.iter().collect();
    machines.sort_by(|a, b| b.total_choices.cmp(&a.total_choices));
    bars(
        machines
            .into_iter()
            .map(|activity| (activity.machine.as_str(), activity.total_choices)),
    )
}

/// The per-machine chart only adds information when several machines are active.
pub fn show_machine_chart(stats: &Stats) -> bool {
    stats.choices_by_machine.len() > 1
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareSlice {
    pub label: String,
    pub color: &'static str,
    /// Cumulative start/end of the slice, in percent of the full turn.
    pub start: f64,
    pub end: f64,
}

/// Pie slices sized by count, labelled with the backend percentage.
pub fn share_slices(stats: &Stats) -> Vec<ShareSlice> {
    let total: u64 = stats.choices_by_button.iter().map(|share| share.count).sum();
    let mut cursor = 0.0;
    stats
        .choices_by_button
        .iter()
        .enumerate()
        .map(|(index, share)| {
            let span = if total == 0 {
                0.0
            } else {
                share.count as f64 * 100.0 / total as f64
            };
            let slice = ShareSlice {
                label: format!("{}: {}%", share.choix, format_percentage(share.percentage)),
                color: palette_color(index),
                start: cursor,
                end: cursor + span,
            };
            cursor += span;
            slice
        })
        .collect()
}

/// CSS `conic-gradient` drawing the pie, or `None` when there is nothing to draw.
pub fn share_gradient(slices: &[ShareSlice]) -> Option<String> {
    let stops: Vec<String> = slices
        .iter()
        .filter(|slice| slice.end > slice.start)
        .map(|slice| format!("{} {:.3}% {:.3}%", slice.color, slice.start, slice.end))
        .collect();
    if stops.is_empty() {
        None
    } else {
        Some(format!("conic-gradient({})", stops.join(", ")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub tick: String,
    pub tooltip: String,
    pub count: u64,
    pub x: f64,
    pub y: f64,
}

/// Daily activity laid out in a `width` x `height` SVG box (origin top-left).
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub points: Vec<DailyPoint>,
    pub max: u64,
}

impl DailySeries {
    /// `points` attribute of an SVG polyline.
    pub fn polyline(&self) -> String {
        self.points
            .iter()
            .map(|point| format!("{:.1},{:.1}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn daily_series(stats: &Stats, width: f64, height: f64) -> DailySeries {
    let days = &stats.daily_activity;
    let max = days.iter().map(|day| day.count).max().unwrap_or(0);
    let step = if days.len() > 1 {
        width / (days.len() - 1) as f64
    } else {
        0.0
    };

    let points = days
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let x = if days.len() > 1 {
                index as f64 * step
            } else {
                width / 2.0
            };
            let ratio = if max == 0 {
                0.0
            } else {
                day.count as f64 / max as f64
            };
            DailyPoint {
                tick: format_day_tick(day.date),
                tooltip: format!("{} · {}", format_day(day.date), format_count(day.count)),
                count: day.count,
                x,
                y: height - ratio * height,
            }
        })
        .collect();

    DailySeries { points, max }
}

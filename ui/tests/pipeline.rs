//! Load → sort → export, driven through the public API only.

use time::UtcOffset;
use ui::core::metrics::{active_machine_count, top_button};
use ui::core::records::ChoiceField;
use ui::core::sort::SortOrder;
use ui::core::tabular::{encode, encode_yielding, ExportFormat};
use ui::dashboard::{DashboardController, DayWindow, Fetch, Resource};

const CHOICES: &str = r#"{
    "items": [
        {"id": 1, "choix": "A", "machine": "borne_02", "video": "/videos/a.mp4", "event_time": "2024-01-15T08:00:00"},
        {"id": 2, "choix": "B", "machine": "borne_01", "video": "/videos/b.mp4", "event_time": "2024-01-15T08:10:00"},
        {"id": 3, "choix": "A", "machine": "borne_03", "video": "/videos/a.mp4", "event_time": "2024-01-15T09:45:00"},
        {"id": 4, "choix": "C", "machine": "borne_01", "video": "/videos/c, \"final\".mp4", "event_time": "2024-01-15T08:20:00"},
        {"id": 5, "choix": "B", "machine": "borne_02", "video": "/videos/b.mp4", "event_time": "2024-01-15T08:30:00"}
    ],
    "total": 5
}"#;

const STATS: &str = r#"{
    "total_choices": 100,
    "total_machines": 4,
    "choices_by_button": [
        {"choix": "A", "count": 60, "percentage": 60.0},
        {"choix": "B", "count": 40, "percentage": 40.0}
    ],
    "daily_activity": [{"date": "2024-01-15", "count": 100}],
    "choices_by_machine": [
        {"machine": "borne_01", "total_choices": 50, "last_activity": "2024-01-15T08:20:00"},
        {"machine": "borne_02", "total_choices": 30},
        {"machine": "borne_03", "total_choices": 20}
    ]
}"#;

fn loaded_controller() -> DashboardController {
    let mut controller = DashboardController::new();
    for ticket in controller.start() {
        let body = match ticket.resource {
            Resource::Machines => "[]",
            Resource::Stats => STATS,
            Resource::Choices => CHOICES,
        };
        assert!(controller.apply(ticket.resolve(Ok(body.to_string()))));
    }
    controller
}

fn ids(controller: &DashboardController) -> Vec<String> {
    controller
        .sorted_choices()
        .into_iter()
        .map(|choice| choice.id)
        .collect()
}

fn machines(controller: &DashboardController) -> Vec<String> {
    controller
        .sorted_choices()
        .into_iter()
        .map(|choice| choice.machine)
        .collect()
}

#[test]
fn default_view_shows_latest_first() {
    let controller = loaded_controller();
    assert_eq!(controller.filter().window, DayWindow::Week);
    assert_eq!(ids(&controller)[0], "3");
    assert_eq!(ids(&controller), vec!["3", "5", "4", "2", "1"]);
}

#[test]
fn machine_header_clicks_flip_the_order() {
    let mut controller = loaded_controller();

    controller.toggle_sort(ChoiceField::Machine);
    let first = machines(&controller);
    let mut expected = first.clone();
    expected.sort();
    expected.reverse();
    assert_eq!(first, expected);
    assert_eq!(controller.sort().order, SortOrder::Desc);

    controller.toggle_sort(ChoiceField::Machine);
    assert_eq!(controller.sort().order, SortOrder::Asc);
    assert_eq!(
        machines(&controller),
        vec!["borne_01", "borne_01", "borne_02", "borne_02", "borne_03"]
    );
    // Ties keep the fetch order.
    assert_eq!(ids(&controller), vec!["2", "4", "1", "5", "3"]);
}

#[test]
fn stats_feed_the_cards() {
    let controller = loaded_controller();
    let Fetch::Ready(stats) = controller.stats() else {
        panic!("stats not loaded");
    };
    let top = top_button(stats).unwrap();
    assert_eq!(top.choix, "A");
    assert_eq!(top.percentage, 60.0);
    assert_eq!(active_machine_count(stats), 3);
}

#[test]
fn export_follows_the_displayed_order() {
    let mut controller = loaded_controller();
    controller.toggle_sort(ChoiceField::Id);
    controller.toggle_sort(ChoiceField::Id);
    let rows = controller.sorted_choices();

    let file = encode(ExportFormat::Csv, &rows, UtcOffset::UTC, "video_analytics").unwrap();
    assert_eq!(file.filename, "video_analytics.csv");
    let text = String::from_utf8(file.bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "ID,Bouton,Machine,Video,Date/Heure");
    assert_eq!(lines[1], "1,A,borne_02,/videos/a.mp4,15/01/2024 08:00:00");
    assert_eq!(
        lines[4],
        "4,C,borne_01,\"/videos/c, \"\"final\"\".mp4\",15/01/2024 08:20:00"
    );
    assert_eq!(lines.len(), 6);
}

#[test]
fn xlsx_export_of_the_same_rows_is_stable() {
    let controller = loaded_controller();
    let rows = controller.sorted_choices();

    let blocking = encode(ExportFormat::Xlsx, &rows, UtcOffset::UTC, "video_analytics").unwrap();
    let yielding = futures::executor::block_on(encode_yielding(
        ExportFormat::Xlsx,
        &rows,
        UtcOffset::UTC,
        "video_analytics",
    ))
    .unwrap();
    assert_eq!(blocking.filename, "video_analytics.xlsx");
    assert_eq!(blocking.bytes.len(), yielding.bytes.len());
    assert_eq!(&blocking.bytes[..2], b"PK");
}

#[test]
fn stale_window_never_replaces_newer_data() {
    let mut controller = DashboardController::new();
    let week = controller.start();
    let month = controller.set_window(DayWindow::Month);

    for ticket in month {
        if ticket.resource == Resource::Stats {
            controller.apply(ticket.resolve(Ok(STATS.to_string())));
        }
    }
    for ticket in week {
        if ticket.resource == Resource::Stats {
            let body = STATS.replace("\"total_choices\": 100", "\"total_choices\": 7");
            assert!(!controller.apply(ticket.resolve(Ok(body))));
        }
    }

    assert_eq!(controller.filter().window.days(), 30);
    assert_eq!(controller.stats().ready().unwrap().total_choices, 100);
}

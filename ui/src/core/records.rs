//! Records and aggregates fetched from the analytics backend.
//!
//! Every payload goes through one of the `decode_*` functions before it
//! reaches a projection or a view. Decoding is strict about shape (missing
//! fields, negative counts, non-numeric values are rejected) and lenient
//! about the few wire variations the backend is known to produce: integer
//! identifiers, naive ISO-8601 timestamps, and `items` as the list key.

use std::collections::HashSet;

use serde::{de, Deserialize, Deserializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};
use tracing::warn;

use super::error::ShapeError;

/// A physical kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Machine {
    #[serde(deserialize_with = "de_identifier")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One button press recorded by a kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Choice {
    #[serde(deserialize_with = "de_identifier")]
    pub id: String,
    pub choix: String,
    pub machine: String,
    pub video: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub event_time: OffsetDateTime,
}

/// A page of choices plus the backend-side total for the active filter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChoicePage {
    #[serde(alias = "items")]
    pub choices: Vec<Choice>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ButtonShare {
    pub choix: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyCount {
    #[serde(deserialize_with = "de_day")]
    pub date: Date,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MachineActivity {
    pub machine: String,
    pub total_choices: u64,
    #[serde(default, deserialize_with = "de_optional_timestamp")]
    pub last_activity: Option<OffsetDateTime>,
}

/// Server-computed aggregate for one `(machine, days)` filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stats {
    pub total_choices: u64,
    pub total_machines: u64,
    pub choices_by_button: Vec<ButtonShare>,
    pub daily_activity: Vec<DailyCount>,
    pub choices_by_machine: Vec<MachineActivity>,
}

/// Columns of a `Choice`, in table and export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceField {
    Id,
    Button,
    Machine,
    Video,
    EventTime,
}

impl ChoiceField {
    pub const ALL: [ChoiceField; 5] = [
        ChoiceField::Id,
        ChoiceField::Button,
        ChoiceField::Machine,
        ChoiceField::Video,
        ChoiceField::EventTime,
    ];

    /// Column header, shared by the on-screen table and both export formats.
    pub fn label(self) -> &'static str {
        match self {
            ChoiceField::Id => "ID",
            ChoiceField::Button => "Bouton",
            ChoiceField::Machine => "Machine",
            ChoiceField::Video => "Video",
            ChoiceField::EventTime => "Date/Heure",
        }
    }
}

pub fn decode_machines(body: &str) -> Result<Vec<Machine>, ShapeError> {
    const RESOURCE: &str = "machines";
    let machines: Vec<Machine> = parse_json(RESOURCE, body)?;

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for machine in &machines {
        if machine.name.trim().is_empty() {
            return Err(ShapeError::invalid(
                RESOURCE,
                format!("name (machine {})", machine.id),
                "is empty",
            ));
        }
        if !ids.insert(machine.id.as_str()) {
            return Err(ShapeError::invalid(
                RESOURCE,
                "id",
                format!("`{}` appears more than once", machine.id),
            ));
        }
        if !names.insert(machine.name.as_str()) {
            warn!(name = %machine.name, "duplicate machine name; filtering by it is ambiguous");
        }
    }

    Ok(machines)
}

pub fn decode_stats(body: &str) -> Result<Stats, ShapeError> {
    const RESOURCE: &str = "stats";
    let stats: Stats = parse_json(RESOURCE, body)?;

    for (index, share) in stats.choices_by_button.iter().enumerate() {
        if !share.percentage.is_finite() || !(0.0..=100.0).contains(&share.percentage) {
            return Err(ShapeError::invalid(
                RESOURCE,
                format!("choices_by_button[{index}].percentage"),
                format!("{} is outside 0..=100", share.percentage),
            ));
        }
    }

    if stats
        .choices_by_button
        .windows(2)
        .any(|pair| pair[0].count < pair[1].count)
    {
        warn!("choices_by_button is not sorted by count; top button may be misleading");
    }
    if stats
        .daily_activity
        .windows(2)
        .any(|pair| pair[0].date >= pair[1].date)
    {
        warn!("daily_activity is not strictly ascending by date");
    }

    Ok(stats)
}

pub fn decode_choices(body: &str) -> Result<ChoicePage, ShapeError> {
    const RESOURCE: &str = "choices";
    let page: ChoicePage = parse_json(RESOURCE, body)?;

    let mut ids = HashSet::with_capacity(page.choices.len());
    for choice in &page.choices {
        if !ids.insert(choice.id.as_str()) {
            return Err(ShapeError::invalid(
                RESOURCE,
                "id",
                format!("`{}` appears more than once", choice.id),
            ));
        }
    }

    if (page.choices.len() as u64) > page.total {
        warn!(
            received = page.choices.len(),
            total = page.total,
            "backend total is smaller than the page it returned"
        );
    }

    Ok(page)
}

/// Parse an event timestamp as emitted by the backend.
///
/// RFC 3339 values keep their offset; naive values
/// (`2024-01-15T10:30:00[.ffffff]`) are stored by the backend in UTC.
pub fn parse_event_time(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(raw, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn parse_json<T: de::DeserializeOwned>(resource: &'static str, body: &str) -> Result<T, ShapeError> {
    serde_json::from_str(body).map_err(|source| ShapeError::Json { resource, source })
}

fn de_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_time(&raw)
        .ok_or_else(|| de::Error::custom(format!("`{raw}` is not an ISO-8601 timestamp")))
}

fn de_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_event_time(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("`{raw}` is not an ISO-8601 timestamp"))),
        None => Ok(None),
    }
}

fn de_day<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Date::parse(&raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| de::Error::custom(format!("`{raw}` is not a YYYY-MM-DD date")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const STATS: &str = r#"{
        "total_choices": 100,
        "total_machines": 3,
        "choices_by_button": [
            {"choix": "A", "count": 60, "percentage": 60.0},
            {"choix": "B", "count": 40, "percentage": 40.0}
        ],
        "daily_activity": [
            {"date": "2024-01-14", "count": 0},
            {"date": "2024-01-15", "count": 100}
        ],
        "choices_by_machine": [
            {"machine": "borne_01", "total_choices": 70, "last_activity": "2024-01-15T10:30:00"},
            {"machine": "borne_02", "total_choices": 30, "last_activity": null}
        ]
    }"#;

    #[test]
    fn decodes_backend_choice_list() {
        let body = r#"{
            "total": 2,
            "items": [
                {"id": 12, "choix": "A", "machine": "borne_01", "video": "/videos/a.mp4",
                 "event_time": "2024-01-15T10:30:00.123456"},
                {"id": "13", "choix": "B", "machine": "borne_02", "video": "/videos/b.mp4",
                 "event_time": "2024-01-15T11:00:00+01:00"}
            ]
        }"#;

        let page = decode_choices(body).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.choices[0].id, "12");
        assert_eq!(page.choices[1].id, "13");
        assert_eq!(
            page.choices[0].event_time,
            datetime!(2024-01-15 10:30:00.123456 UTC)
        );
        assert_eq!(
            page.choices[1].event_time,
            datetime!(2024-01-15 10:00:00 UTC)
        );
    }

    #[test]
    fn accepts_choices_key() {
        let body = r#"{"total": 0, "choices": []}"#;
        assert!(decode_choices(body).unwrap().choices.is_empty());
    }

    #[test]
    fn rejects_missing_field() {
        let body = r#"{"total": 1, "items": [
            {"id": 1, "choix": "A", "video": "/v.mp4", "event_time": "2024-01-15T10:30:00"}
        ]}"#;
        let err = decode_choices(body).unwrap_err();
        assert!(matches!(err, ShapeError::Json { resource: "choices", .. }));
        assert!(err.to_string().contains("machine"));
    }

    #[test]
    fn rejects_wrong_primitive_kind() {
        let body = STATS.replace("\"total_choices\": 100", "\"total_choices\": \"100\"");
        assert!(matches!(
            decode_stats(&body),
            Err(ShapeError::Json { resource: "stats", .. })
        ));

        let negative = STATS.replace("\"count\": 40", "\"count\": -40");
        assert!(decode_stats(&negative).is_err());
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let body = r#"{"total": 1, "items": [
            {"id": 1, "choix": "A", "machine": "m", "video": "/v.mp4", "event_time": "hier"}
        ]}"#;
        let err = decode_choices(body).unwrap_err();
        assert!(err.to_string().contains("hier"));
    }

    #[test]
    fn rejects_duplicate_choice_ids() {
        let body = r#"{"total": 2, "items": [
            {"id": 1, "choix": "A", "machine": "m", "video": "/v.mp4", "event_time": "2024-01-15T10:30:00"},
            {"id": "1", "choix": "B", "machine": "m", "video": "/v.mp4", "event_time": "2024-01-15T10:31:00"}
        ]}"#;
        assert!(matches!(
            decode_choices(body),
            Err(ShapeError::Invalid { resource: "choices", .. })
        ));
    }

    #[test]
    fn decodes_stats_and_days() {
        let stats = decode_stats(STATS).unwrap();
        assert_eq!(stats.total_choices, 100);
        assert_eq!(stats.daily_activity.len(), 2);
        assert_eq!(
            stats.daily_activity[1].date,
            Date::from_calendar_date(2024, time::Month::January, 15).unwrap()
        );
        assert_eq!(
            stats.choices_by_machine[0].last_activity,
            Some(datetime!(2024-01-15 10:30:00 UTC))
        );
        assert_eq!(stats.choices_by_machine[1].last_activity, None);
    }

    #[test]
    fn rejects_out_of_range_percentage() {
        let body = STATS.replace("\"percentage\": 40.0", "\"percentage\": 140.0");
        let err = decode_stats(&body).unwrap_err();
        assert!(err.to_string().contains("choices_by_button[1].percentage"));
    }

    #[test]
    fn rejects_malformed_day() {
        let body = STATS.replace("2024-01-14", "14/01/2024");
        assert!(decode_stats(&body).is_err());
    }

    #[test]
    fn decodes_machines_with_optional_fields() {
        let body = r#"[
            {"id": 1, "name": "borne_01", "location": "Hall", "description": null,
             "created_at": "2024-01-01T00:00:00", "last_seen": "2024-01-15T10:30:00"},
            {"id": 2, "name": "borne_02"}
        ]"#;
        let machines = decode_machines(body).unwrap();
        assert_eq!(machines.len(), 2);
        assert_eq!(machines[0].location.as_deref(), Some("Hall"));
        assert_eq!(machines[1].location, None);
    }

    #[test]
    fn rejects_blank_machine_name() {
        let body = r#"[{"id": 1, "name": "  "}]"#;
        assert!(decode_machines(body).is_err());
    }
}

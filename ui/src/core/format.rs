//! Formatting helpers for presenting counts, shares and timestamps.
//!
//! Everything renders the way the operators read it (fr-FR): grouped
//! thousands, `dd/mm/yyyy` dates and 24-hour clock times.

use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};

use super::error::ExportError;
use super::records::Machine;

/// fr-FR digit group separator (narrow no-break space).
pub const GROUP_SEPARATOR: char = '\u{202F}';

/// `12345` -> `12 345`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(digit);
    }
    grouped
}

/// Percentages are displayed exactly as the backend rounded them.
/// `decode_stats` has already rejected non-finite values.
pub fn format_percentage(value: f64) -> String {
    format!("{value}")
}

/// Event time in the viewer's zone, e.g. `15/01/2024 10:30:00`.
///
/// Fails when the shift leaves the range `time` can represent (year 9999 at a
/// positive offset, for instance).
pub fn format_event_time(at: OffsetDateTime, offset: UtcOffset) -> Result<String, ExportError> {
    let local = at
        .checked_to_offset(offset)
        .ok_or(ExportError::TimeOutOfRange { at, offset })?;
    Ok(local.format(&format_description!(
        "[day]/[month]/[year] [hour]:[minute]:[second]"
    ))?)
}

/// Full date label used in chart tooltips.
pub fn format_day(date: Date) -> String {
    date.format(&format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| "—".to_string())
}

/// Compact axis tick, e.g. `15/1`.
pub fn format_day_tick(date: Date) -> String {
    format!("{}/{}", date.day(), u8::from(date.month()))
}

/// Final path segment of a video path; the table shows only this part.
pub fn video_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Option label in the machine filter: `name (location)` when a location exists.
pub fn machine_option_label(machine: &Machine) -> String {
    match machine
        .location
        .as_deref()
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
    {
        Some(location) => format!("{} ({location})", machine.name),
        None => machine.name.clone(),
    }
}

//! Table ordering for `Choice` records.
//!
//! Each column has one named comparator; `SortState` only picks which one runs
//! and in which direction. Sorting is stable, so records that compare equal
//! keep the order the backend returned them in.

use std::cmp::Ordering;

use super::records::{Choice, ChoiceField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Active sort column and direction. Starts on the most recent events first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: ChoiceField,
    pub order: SortOrder,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: ChoiceField::EventTime,
            order: SortOrder::Desc,
        }
    }
}

impl SortState {
    /// Header click: the active column flips direction, another column starts descending.
    pub fn toggled(self, field: ChoiceField) -> Self {
        if self.field == field {
            Self {
                field,
                order: self.order.flipped(),
            }
        } else {
            Self {
                field,
                order: SortOrder::Desc,
            }
        }
    }

    pub fn toggle(&mut self, field: ChoiceField) {
        *self = self.toggled(field);
    }

    pub fn apply(&self, records: &[Choice]) -> Vec<Choice> {
        sort_choices(records, self.field, self.order)
    }

    /// Arrow shown next to a column header.
    pub fn indicator(&self, field: ChoiceField) -> &'static str {
        if self.field != field {
            return "↕";
        }
        match self.order {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }

    /// `aria-sort` value for a column header.
    pub fn aria_sort(&self, field: ChoiceField) -> &'static str {
        if self.field != field {
            return "none";
        }
        match self.order {
            SortOrder::Asc => "ascending",
            SortOrder::Desc => "descending",
        }
    }
}

/// Returns a new, stably ordered copy of `records`.
pub fn sort_choices(records: &[Choice], field: ChoiceField, order: SortOrder) -> Vec<Choice> {
    let compare = comparator(field);
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| match order {
        SortOrder::Asc => compare(a, b),
        SortOrder::Desc => compare(b, a),
    });
    sorted
}

pub fn comparator(field: ChoiceField) -> fn(&Choice, &Choice) -> Ordering {
    match field {
        ChoiceField::Id => by_id,
        ChoiceField::Button => by_button,
        ChoiceField::Machine => by_machine,
        ChoiceField::Video => by_video,
        ChoiceField::EventTime => by_event_time,
    }
}

/// Backend ids are decimal integers carried as text, so numeric ids compare
/// by value ("9" before "10"). Any other id sorts after every numeric one, in
/// text order. Equal values ("7", "007") fall back to text so the order stays total.
fn by_id(a: &Choice, b: &Choice) -> Ordering {
    id_key(&a.id).cmp(&id_key(&b.id))
}

fn id_key(id: &str) -> (bool, u64, &str) {
    match id.parse::<u64>() {
        Ok(value) => (false, value, id),
        Err(_) => (true, 0, id),
    }
}

fn by_button(a: &Choice, b: &Choice) -> Ordering {
    a.choix.cmp(&b.choix)
}

fn by_machine(a: &Choice, b: &Choice) -> Ordering {
    a.machine.cmp(&b.machine)
}

fn by_video(a: &Choice, b: &Choice) -> Ordering {
    a.video.cmp(&b.video)
}

fn by_event_time(a: &Choice, b: &Choice) -> Ordering {
    a.event_time.cmp(&b.event_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::datetime, Duration, OffsetDateTime};

    fn choice(id: &str, choix: &str, machine: &str, at: OffsetDateTime) -> Choice {
        Choice {
            id: id.into(),
            choix: choix.into(),
            machine: machine.into(),
            video: format!("/videos/{choix}.mp4"),
            event_time: at,
        }
    }

    fn ids(records: &[Choice]) -> Vec<&str> {
        records.iter().map(|c| c.id.as_str()).collect()
    }

    fn sample() -> Vec<Choice> {
        let base = datetime!(2024-01-15 08:00:00 UTC);
        vec![
            choice("1", "B", "borne_02", base),
            choice("2", "A", "borne_01", base + Duration::minutes(5)),
            choice("3", "B", "borne_01", base + Duration::minutes(1)),
            choice("4", "A", "borne_02", base + Duration::minutes(9)),
            choice("5", "C", "borne_01", base + Duration::minutes(3)),
        ]
    }

    #[test]
    fn default_state_is_latest_first() {
        let state = SortState::default();
        assert_eq!(ids(&state.apply(&sample())), vec!["4", "2", "5", "3", "1"]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let records = sample();
        for field in ChoiceField::ALL {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let sorted = sort_choices(&records, field, order);
                let compare = comparator(field);
                for (i, left) in sorted.iter().enumerate() {
                    for right in &sorted[i + 1..] {
                        if compare(left, right) == Ordering::Equal {
                            let li = records.iter().position(|r| r.id == left.id).unwrap();
                            let ri = records.iter().position(|r| r.id == right.id).unwrap();
                            assert!(li < ri, "{field:?} {order:?} reordered {} and {}", left.id, right.id);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn machine_ties_follow_input_order() {
        let sorted = sort_choices(&sample(), ChoiceField::Machine, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec!["2", "3", "5", "1", "4"]);

        let sorted = sort_choices(&sample(), ChoiceField::Machine, SortOrder::Desc);
        assert_eq!(ids(&sorted), vec!["1", "4", "2", "3", "5"]);
    }

    #[test]
    fn event_time_directions_are_exact_reverses() {
        let records = sample();
        let desc = sort_choices(&records, ChoiceField::EventTime, SortOrder::Desc);
        let mut asc = sort_choices(&records, ChoiceField::EventTime, SortOrder::Asc);
        asc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn event_time_compares_instants_not_text() {
        let early = choice("1", "A", "m", datetime!(2024-01-15 10:00:00 +02:00));
        let late = choice("2", "A", "m", datetime!(2024-01-15 09:30:00 UTC));
        let sorted = sort_choices(&[late.clone(), early.clone()], ChoiceField::EventTime, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec!["1", "2"]);
    }

    #[test]
    fn numeric_ids_sort_by_value() {
        let at = datetime!(2024-01-15 08:00:00 UTC);
        let records = vec![choice("10", "A", "m", at), choice("9", "A", "m", at), choice("100", "A", "m", at)];
        let sorted = sort_choices(&records, ChoiceField::Id, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec!["9", "10", "100"]);
    }

    #[test]
    fn mixed_ids_put_numbers_first() {
        let at = datetime!(2024-01-15 08:00:00 UTC);
        let records: Vec<Choice> = ["1a", "10", "b", "9", "007", "7"]
            .into_iter()
            .map(|id| choice(id, "A", "m", at))
            .collect();

        let sorted = sort_choices(&records, ChoiceField::Id, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec!["007", "7", "9", "10", "1a", "b"]);

        // Transitive over every triple.
        for a in &records {
            for b in &records {
                for c in &records {
                    if by_id(a, b) != Ordering::Greater && by_id(b, c) != Ordering::Greater {
                        assert_ne!(by_id(a, c), Ordering::Greater, "{} {} {}", a.id, b.id, c.id);
                    }
                }
            }
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let records = sample();
        let before = records.clone();
        let _ = sort_choices(&records, ChoiceField::Button, SortOrder::Asc);
        assert_eq!(records, before);
    }

    #[test]
    fn empty_input_sorts_to_empty() {
        for field in ChoiceField::ALL {
            assert!(sort_choices(&[], field, SortOrder::Desc).is_empty());
        }
    }

    #[test]
    fn toggle_semantics() {
        let mut state = SortState {
            field: ChoiceField::Button,
            order: SortOrder::Asc,
        };

        state.toggle(ChoiceField::Machine);
        assert_eq!(state.order, SortOrder::Desc);
        assert_eq!(state.field, ChoiceField::Machine);

        state.toggle(ChoiceField::Machine);
        assert_eq!(state.order, SortOrder::Asc);

        state.toggle(ChoiceField::Video);
        assert_eq!(
            state,
            SortState {
                field: ChoiceField::Video,
                order: SortOrder::Desc
            }
        );
    }

    #[test]
    fn indicators_follow_state() {
        let state = SortState::default();
        assert_eq!(state.indicator(ChoiceField::EventTime), "↓");
        assert_eq!(state.indicator(ChoiceField::Id), "↕");
        let state = state.toggled(ChoiceField::EventTime);
        assert_eq!(state.indicator(ChoiceField::EventTime), "↑");
        assert_eq!(state.aria_sort(ChoiceField::EventTime), "ascending");
        assert_eq!(state.aria_sort(ChoiceField::Machine), "none");
    }
}

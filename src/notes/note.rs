use chrono::{NaiveDate, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub order_index: i64,
}

impl Note {
    /// A note with a time of day carries a reminder.
    pub fn has_alarm(&self) -> bool {
        self.time.is_some()
    }

    pub fn time_display(&self) -> Option<String> {
        self.time.map(time_key)
    }

    pub(crate) fn apply(&mut self, update: &NoteUpdate) {
        if let Some(ref description) = update.description {
            self.description = description.clone();
        }
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(order_index) = update.order_index {
            self.order_index = order_index;
        }
    }
}

/// Partial set of fields written by an update. `None` leaves a field untouched;
/// `time: Some(None)` clears the reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub description: Option<String>,
    pub time: Option<Option<NaiveTime>>,
    pub order_index: Option<i64>,
}

impl NoteUpdate {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn time(time: Option<NaiveTime>) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn order_index(order_index: i64) -> Self {
        Self {
            order_index: Some(order_index),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.time.is_none() && self.order_index.is_none()
    }
}

/// Canonical `YYYY-MM-DD` key a note is filed under.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date_key(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn time_key(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parses `HH:MM`. Blank input means "no time" and yields `None`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT).ok()
}

/// Sort order shared by the database queries and the in-memory cache.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, order_index: i64) -> Note {
        Note {
            id,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            time: None,
            description: format!("note {id}"),
            order_index,
        }
    }

    #[test]
    fn date_key_is_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(date_key(date), "2025-01-07");
        assert_eq!(parse_date_key(" 2025-01-07 "), Some(date));
        assert_eq!(parse_date_key("07.01.2025"), None);
    }

    #[test]
    fn blank_time_is_none() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("   "), None);
        assert_eq!(parse_time("9:5x"), None);
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn alarm_follows_time() {
        let mut n = note(1, 0);
        assert!(!n.has_alarm());
        n.time = NaiveTime::from_hms_opt(7, 0, 0);
        assert!(n.has_alarm());
        assert_eq!(n.time_display().as_deref(), Some("07:00"));
    }

    #[test]
    fn sort_by_order_then_newest_first() {
        let mut notes = vec![note(1, 1), note(2, 0), note(3, 0), note(4, 2)];
        sort_notes(&mut notes);
        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn apply_merges_only_supplied_fields() {
        let mut n = note(1, 0);
        n.time = NaiveTime::from_hms_opt(8, 0, 0);

        n.apply(&NoteUpdate::description("changed"));
        assert_eq!(n.description, "changed");
        assert!(n.has_alarm());

        n.apply(&NoteUpdate::time(None));
        assert!(!n.has_alarm());
        assert_eq!(n.description, "changed");
        assert_eq!(n.order_index, 0);
    }
}

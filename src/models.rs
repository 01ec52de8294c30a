use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Per-user record of the days a workout was done.
///
/// Presence of a `YYYY-MM-DD` key with value `true` marks the day. The whole
/// document is written back on every save, including any fields this client
/// does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDocument {
    #[serde(default)]
    pub workouts: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkoutDocument {
    /// Document synthesized when a user's workouts could not be fetched.
    pub fn empty() -> Self {
        Self {
            updated_at: Some(now_timestamp()),
            ..Self::default()
        }
    }

    /// Document written eagerly when a user is created.
    pub fn initial() -> Self {
        Self {
            created_at: Some(now_timestamp()),
            ..Self::default()
        }
    }

    pub fn is_marked(&self, date: NaiveDate) -> bool {
        self.workouts.get(&date_key(date)).copied().unwrap_or(false)
    }

    pub fn set_marked(&mut self, date: NaiveDate, marked: bool) {
        if marked {
            self.workouts.insert(date_key(date), true);
        } else {
            self.workouts.remove(&date_key(date));
        }
    }

    /// Flips the mark for `date`, stamps `updatedAt` and returns the previous state.
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        let was_marked = self.is_marked(date);
        self.set_marked(date, !was_marked);
        self.updated_at = Some(now_timestamp());
        was_marked
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-02-15T09:30:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Notes shown when a user's notes document cannot be fetched. Never persisted
/// until the user saves.
pub fn placeholder_notes(name: &str) -> String {
    format!("# Notes for {name}\n\nWrite your notes here.")
}

pub fn welcome_notes(name: &str) -> String {
    format!("# Notes for {name}\n\nWelcome, {name}!\n")
}

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::datetime::parse_timestamp;

/// Longest title the form accepts, in characters.
pub const TITLE_MAX_CHARS: usize = 60;

/// Storage format for reminders (the `datetime-local` shape).
pub const REMINDER_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub type TaskId = String;

/// A single to-do item as it is stored in the `todos` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reminder: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}

/// Values captured by the task form; everything except identity and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub notes: Option<String>,
    pub reminder: Option<String>,
    pub completed: bool,
}

impl TaskFields {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            notes: None,
            reminder: None,
            completed: false,
        }
    }
}

impl Task {
    pub fn new(id: TaskId, fields: TaskFields, created: DateTime<Local>) -> Self {
        Self {
            id,
            title: fields.title,
            notes: fields.notes.filter(|n| !n.is_empty()),
            reminder: fields.reminder.filter(|r| !r.is_empty()),
            completed: false,
            created_at: created
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Overlay submitted form values; `id` and `created_at` stay put.
    pub fn merge(&mut self, fields: TaskFields) {
        self.title = fields.title;
        self.notes = fields.notes.filter(|n| !n.is_empty());
        self.reminder = fields.reminder.filter(|r| !r.is_empty());
        self.completed = fields.completed;
    }

    pub fn reminder_at(&self) -> Option<DateTime<Local>> {
        self.reminder.as_deref().and_then(parse_timestamp)
    }

    pub fn is_upcoming(&self, now: DateTime<Local>) -> bool {
        !self.completed && self.reminder_at().is_some_and(|at| at > now)
    }

    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(needle))
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

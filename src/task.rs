//! To-do tasks (iCal `VTODO` item)

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};

use crate::item::ItemId;

/// The `STATUS` of a `VTODO`, as defined by RFC5545
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    NeedsAction,
    InProcess,
    Completed,
    Cancelled,
    /// Any other (e.g. `X-` prefixed) value
    Other(String),
}

impl TaskStatus {
    /// Parse an iCal `STATUS` value
    pub fn from_ical(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "NEEDS-ACTION" => Self::NeedsAction,
            "IN-PROCESS" => Self::InProcess,
            "COMPLETED" => Self::Completed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn as_ical(&self) -> &str {
        match self {
            Self::NeedsAction => "NEEDS-ACTION",
            Self::InProcess => "IN-PROCESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Other(s) => s,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ical())
    }
}


/// A to-do task, as retrieved from a server.
///
/// This is a handle that is valid until the next listing: it keeps the iCal data it has been built from, so that it can be saved back.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    /// The task URL
    id: ItemId,

    /// Persistent, globally unique identifier for the calendar component
    uid: String,

    /// The display name of the task
    summary: String,

    status: TaskStatus,
    /// When it has been completed, if it has
    completed_on: Option<DateTime<Utc>>,

    /// The whole iCal resource this task was parsed from
    ical: String,
}

impl Task {
    pub fn new(id: ItemId, uid: String, summary: String, status: TaskStatus,
               completed_on: Option<DateTime<Utc>>, ical: String) -> Self
    {
        Self { id, uid, summary, status, completed_on, ical }
    }

    pub fn id(&self) -> &ItemId        { &self.id          }
    pub fn uid(&self) -> &str          { &self.uid         }
    pub fn summary(&self) -> &str      { &self.summary     }
    pub fn status(&self) -> &TaskStatus { &self.status     }
    pub fn completed_on(&self) -> Option<&DateTime<Utc>> { self.completed_on.as_ref() }
    pub fn ical(&self) -> &str         { &self.ical        }

    /// Whether this task should be listed as something to do
    pub fn needs_action(&self) -> bool {
        self.status == TaskStatus::NeedsAction
    }

    pub fn completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Returns a copy of this handle, with a new status.
    /// This only changes this local copy, not the server.
    pub fn with_status(&self, status: TaskStatus, completed_on: Option<DateTime<Utc>>) -> Self {
        Self {
            status,
            completed_on,
            ..self.clone()
        }
    }
}

use std::error::Error;

use async_trait::async_trait;

use crate::calendar::CalendarRef;
use crate::config::Configuration;
use crate::task::Task;

/// The error type returned by any data source.
///
/// Whatever the actual cause (authentication, DNS, unexpected server reply...), callers only get a human-readable message.
pub type CalDavError = Box<dyn Error + Send + Sync>;

/// A source of CalDAV data, usually a session opened on a server.
///
/// A value implementing this trait lives for a single workflow invocation, and is dropped (i.e. closed) on every exit path.
#[async_trait]
pub trait CalDavSource: Send + Sync {
    /// Returns the calendars visible to the authenticated principal, in the order the server returns them
    async fn get_calendars(&self) -> Result<Vec<CalendarRef>, CalDavError>;

    /// Returns the tasks of `calendar` whose status is `NEEDS-ACTION`.
    /// Items that cannot be parsed, or that have no summary, are silently skipped.
    async fn get_incomplete_tasks(&self, calendar: &CalendarRef) -> Result<Vec<Task>, CalDavError>;

    /// Marks a task as completed, and saves it on the source in a single round trip.
    ///
    /// This is best-effort: the task may have been changed or removed since it has been listed.
    async fn complete_task(&self, task: &Task) -> Result<(), CalDavError>;
}

/// Something that is able to open a [`CalDavSource`] session from a [`Configuration`]
pub trait Connector {
    type Source: CalDavSource;

    /// Open a session. This may or may not already talk to the server
    fn connect(&self, config: &Configuration) -> Result<Self::Source, CalDavError>;
}

//! The two operations of the app: listing the tasks that still need action, and completing one of them.
//!
//! Each call opens its own session (see [`Connector`]) and closes it before returning, whatever the outcome.

use thiserror::Error;

use crate::calendar::find_by_name;
use crate::client::ClientConnector;
use crate::config::Configuration;
use crate::progress::{send_feedback, FeedbackSender, WorkflowEvent};
use crate::task::Task;
use crate::traits::{CalDavError, CalDavSource, Connector};


/// The outcome of [`fetch_tasks`]
#[derive(Clone, Debug, PartialEq)]
pub enum TaskListResult {
    /// The tasks whose status is `NEEDS-ACTION`, in the order the server returned them
    Tasks(Vec<Task>),
    /// No calendar has this display name
    CalendarNotFound(String),
    /// Something went wrong while talking to the server
    ConnectionError(String),
}

/// Why a task could not be completed. The message is the one of the underlying failure.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct CompletionError(pub String);


/// Fetch the incomplete tasks of the calendar named in `config`, from a CalDAV server
pub async fn fetch_tasks(config: &Configuration) -> TaskListResult {
    fetch_tasks_with(&ClientConnector, config, None).await
}

/// Fetch the incomplete tasks of the calendar named in `config`, through any [`Connector`]
pub async fn fetch_tasks_with<C: Connector>(connector: &C, config: &Configuration, feedback: Option<&FeedbackSender>) -> TaskListResult {
    send_feedback(feedback, WorkflowEvent::Connecting);
    let result = match connector.connect(config) {
        Err(err) => {
            log::warn!("Unable to connect to {}: {}", config.server_url, err);
            TaskListResult::ConnectionError(err.to_string())
        },
        Ok(session) => {
            let result = fetch_tasks_from(&session, &config.calendar_name, feedback).await;
            drop(session);
            result
        },
    };

    let event = match &result {
        TaskListResult::Tasks(tasks) => WorkflowEvent::Finished{ success: true, details: format!("Found {} tasks.", tasks.len()) },
        TaskListResult::CalendarNotFound(name) => WorkflowEvent::Finished{ success: false, details: format!("Calendar '{}' not found.", name) },
        TaskListResult::ConnectionError(msg) => WorkflowEvent::Finished{ success: false, details: msg.clone() },
    };
    send_feedback(feedback, event);
    result
}

/// Fetch the incomplete tasks of a calendar, from an already opened session
pub async fn fetch_tasks_from<S: CalDavSource + ?Sized>(source: &S, calendar_name: &str, feedback: Option<&FeedbackSender>) -> TaskListResult {
    let calendars = match source.get_calendars().await {
        Err(err) => {
            log::warn!("Unable to list calendars: {}", err);
            return TaskListResult::ConnectionError(err.to_string());
        },
        Ok(cals) => cals,
    };

    let calendar = match find_by_name(&calendars, calendar_name) {
        None => {
            log::info!("No calendar named {:?} among {} calendars", calendar_name, calendars.len());
            return TaskListResult::CalendarNotFound(calendar_name.to_string());
        },
        Some(cal) => cal,
    };
    if calendar.supports_todo() == false {
        log::warn!("Calendar {} does not advertise VTODO support. Querying it anyway", calendar);
    }

    send_feedback(feedback, WorkflowEvent::Fetching{ calendar: calendar.name().to_string() });
    match source.get_incomplete_tasks(calendar).await {
        Err(err) => {
            log::warn!("Unable to fetch tasks from {}: {}", calendar, err);
            TaskListResult::ConnectionError(err.to_string())
        },
        Ok(tasks) => TaskListResult::Tasks(tasks),
    }
}


/// Mark a task as completed on the CalDAV server.
///
/// On success, the caller is expected to fetch the tasks again rather than patching its current list.
pub async fn complete_task(config: &Configuration, task: &Task) -> Result<(), CompletionError> {
    complete_task_with(&ClientConnector, config, task, None).await
}

/// Mark a task as completed, through any [`Connector`]
pub async fn complete_task_with<C: Connector>(connector: &C, config: &Configuration, task: &Task, feedback: Option<&FeedbackSender>) -> Result<(), CompletionError> {
    send_feedback(feedback, WorkflowEvent::Completing{ task: task.summary().to_string() });

    let result = complete_on(connector, config, task).await;
    match &result {
        Ok(()) => {
            log::info!("Completed task {}", task.summary());
            send_feedback(feedback, WorkflowEvent::Finished{ success: true, details: format!("Task '{}' completed.", task.summary()) });
        },
        Err(err) => {
            log::warn!("Unable to complete task {}: {}", task.summary(), err);
            send_feedback(feedback, WorkflowEvent::Finished{ success: false, details: err.to_string() });
        },
    }
    result.map_err(|err| CompletionError(err.to_string()))
}

async fn complete_on<C: Connector>(connector: &C, config: &Configuration, task: &Task) -> Result<(), CalDavError> {
    let session = connector.connect(config)?;
    session.complete_task(task).await
}

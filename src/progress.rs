//! Utilities to track the progression of a workflow

use std::fmt::{Display, Error, Formatter};

/// An event that happens while tasks are listed or completed
#[derive(Clone, Debug, PartialEq)]
pub enum WorkflowEvent {
    /// Nothing is running
    Idle,
    /// The configuration is being (re)loaded
    Loading,
    /// A session is being opened to the server
    Connecting,
    /// Incomplete tasks are being retrieved from a calendar
    Fetching{ calendar: String },
    /// A task is being saved as completed
    Completing{ task: String },
    /// The workflow is over
    Finished{ success: bool, details: String },
}

impl Display for WorkflowEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            WorkflowEvent::Idle => write!(f, "Ready"),
            WorkflowEvent::Loading => write!(f, "Loading..."),
            WorkflowEvent::Connecting => write!(f, "Connecting..."),
            WorkflowEvent::Fetching{..} => write!(f, "Fetching tasks..."),
            WorkflowEvent::Completing{task} => write!(f, "Completing '{}'...", task),
            WorkflowEvent::Finished{success, details} => match success {
                true => write!(f, "Success! {}", details),
                false => write!(f, "Failed: {}", details),
            }
        }
    }
}

impl Default for WorkflowEvent {
    fn default() -> Self {
        Self::Idle
    }
}


/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<WorkflowEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<WorkflowEvent>;

/// Create a feedback channel, that can be used to follow the progress of the workflows
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(WorkflowEvent::default())
}

/// Send an event to the listener (if any).
///
/// A listener that went away is not an error.
pub fn send_feedback(channel: Option<&FeedbackSender>, event: WorkflowEvent) {
    if let Some(sender) = channel {
        log::trace!("Progress: {}", event);
        let _ = sender.send(event);
    }
}

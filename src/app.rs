//! The state of a task list front-end, independent from any actual UI toolkit
//!
//! [`AppState`] runs the [`workflow`](crate::workflow)s one at a time, and turns their outcomes into a [`RenderModel`] that a front-end only has to display.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{load_config_from, Configuration};
use crate::progress::{send_feedback, FeedbackSender, WorkflowEvent};
use crate::task::Task;
use crate::traits::Connector;
use crate::workflow::{complete_task_with, fetch_tasks_with, CompletionError, TaskListResult};

pub const LOADING: &str = "Loading...";
pub const NOT_CONFIGURED: &str = "Error: config.ini not found or invalid.";
pub const NO_TASKS: &str = "No tasks found.";
pub const NO_SELECTION: &str = "Please select a task first.";

/// What a front-end should display
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderModel {
    /// The content of the task list area. This is either the task summaries, or a single message
    pub lines: Vec<String>,
    /// A status (or error) line
    pub status: String,
    /// The index of the selected task, if any
    pub selection: Option<usize>,
}

impl RenderModel {
    fn message(text: String) -> Self {
        Self {
            lines: vec![text.clone()],
            status: text,
            selection: None,
        }
    }
}


/// The state of the app: the tasks that are currently listed, and how they are displayed
pub struct AppState<C: Connector> {
    connector: C,
    config_path: PathBuf,

    /// The handles of the listed tasks, in the same order as the rendered lines
    tasks: Vec<Task>,
    model: RenderModel,

    timeout: Option<Duration>,
    feedback: Option<FeedbackSender>,
}

impl<C: Connector> AppState<C> {
    /// Create an app state. Nothing is fetched until [`Self::refresh`] is called
    pub fn new<P: AsRef<Path>>(connector: C, config_path: P) -> Self {
        Self {
            connector,
            config_path: config_path.as_ref().to_path_buf(),
            tasks: Vec::new(),
            model: RenderModel::default(),
            timeout: None,
            feedback: None,
        }
    }

    /// Give up on a workflow that takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Publish the progress of the workflows to this channel
    pub fn with_feedback(mut self, sender: FeedbackSender) -> Self {
        self.feedback = Some(sender);
        self
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.model.selection.and_then(|index| self.tasks.get(index))
    }

    /// Select the task at `index`. Returns false (and keeps the current selection) in case there is no such task
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tasks.len() {
            log::debug!("Ignoring the selection of task #{} among {}", index, self.tasks.len());
            return false;
        }
        self.model.selection = Some(index);
        true
    }

    /// Fetch the tasks again, and replace the whole list with them.
    ///
    /// Returns whether tasks (possibly none) could be listed.
    pub async fn refresh(&mut self) -> bool {
        self.tasks.clear();
        self.model = RenderModel::message(LOADING.to_string());
        send_feedback(self.feedback.as_ref(), WorkflowEvent::Loading);

        let config = match self.load_config() {
            Some(config) => config,
            None => {
                self.model = RenderModel::message(NOT_CONFIGURED.to_string());
                return false;
            },
        };

        let fetch = fetch_tasks_with(&self.connector, &config, self.feedback.as_ref());
        let result = match with_deadline(self.timeout, fetch).await {
            Ok(result) => result,
            Err(timed_out) => TaskListResult::ConnectionError(timed_out),
        };

        match result {
            TaskListResult::Tasks(tasks) if tasks.is_empty() => {
                self.model = RenderModel::message(NO_TASKS.to_string());
                true
            },
            TaskListResult::Tasks(tasks) => {
                self.model = RenderModel {
                    lines: tasks.iter().map(|task| task.summary().to_string()).collect(),
                    status: format!("Success! Found {} tasks.", tasks.len()),
                    selection: None,
                };
                self.tasks = tasks;
                true
            },
            TaskListResult::CalendarNotFound(name) => {
                self.model = RenderModel::message(format!("Error: Calendar '{}' not found.", name));
                false
            },
            TaskListResult::ConnectionError(msg) => {
                self.model = RenderModel::message(format!("Error: {}", msg));
                false
            },
        }
    }

    /// Complete the selected task, then refresh the list.
    ///
    /// In case the completion fails, the list is left as it is.
    pub async fn complete_selected(&mut self) {
        let task = match self.selected_task() {
            Some(task) => task.clone(),
            None => {
                self.model.status = NO_SELECTION.to_string();
                return;
            },
        };

        let config = match self.load_config() {
            Some(config) => config,
            None => {
                self.model.status = NOT_CONFIGURED.to_string();
                return;
            },
        };

        let completion = complete_task_with(&self.connector, &config, &task, self.feedback.as_ref());
        let result = match with_deadline(self.timeout, completion).await {
            Ok(result) => result,
            Err(timed_out) => Err(CompletionError(timed_out)),
        };

        match result {
            Err(err) => {
                self.model.status = format!("Error: {}", err);
            },
            Ok(()) => {
                if self.refresh().await {
                    self.model.status = format!("Task '{}' completed.", task.summary());
                }
            },
        }
    }

    fn load_config(&self) -> Option<Configuration> {
        match load_config_from(&self.config_path) {
            Ok(config) => Some(config),
            Err(err) => {
                log::warn!("{}", err);
                send_feedback(self.feedback.as_ref(), WorkflowEvent::Finished{ success: false, details: err.to_string() });
                None
            },
        }
    }
}

/// Run `fut`, unless it takes longer than `timeout`
async fn with_deadline<F: Future>(timeout: Option<Duration>, fut: F) -> Result<F::Output, String> {
    match timeout {
        None => Ok(fut.await),
        Some(duration) => tokio::time::timeout(duration, fut)
            .await
            .map_err(|_| format!("Operation timed out after {}s", duration.as_secs_f64())),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::mock_behaviour::MockBehaviour;
    use crate::mock_source::MockSource;
    use crate::progress::feedback_channel;
    use crate::task::TaskStatus;

    fn write_config(calendar_name: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[caldav]\nurl = https://mock.server/\nusername = john\npassword = secret\ncalendar_name = {}\n", calendar_name).unwrap();
        file
    }

    fn server_with_tasks() -> MockSource {
        let server = MockSource::new();
        let work = server.add_calendar("Work");
        server.add_task(&work, "Write the report", TaskStatus::NeedsAction);
        server.add_task(&work, "Book the room", TaskStatus::Completed);
        server.add_task(&work, "Call the plumber", TaskStatus::NeedsAction);
        server
    }

    #[tokio::test]
    async fn test_refresh() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = write_config("Work");
        let mut app = AppState::new(server_with_tasks(), config.path());

        assert!(app.refresh().await);
        assert_eq!(app.model().lines, vec!["Write the report", "Call the plumber"]);
        assert_eq!(app.model().status, "Success! Found 2 tasks.");
        assert_eq!(app.model().selection, None);
        assert_eq!(app.tasks().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = AppState::new(server_with_tasks(), dir.path().join("config.ini"));
        assert!(app.refresh().await == false);
        assert_eq!(app.model().lines, vec![NOT_CONFIGURED]);

        let config = write_config("Home");
        let mut app = AppState::new(server_with_tasks(), config.path());
        assert!(app.refresh().await == false);
        assert_eq!(app.model().lines, vec!["Error: Calendar 'Home' not found."]);
        assert!(app.tasks().is_empty());

        let server = server_with_tasks();
        server.add_calendar("Home");
        let mut app = AppState::new(server, config.path());
        assert!(app.refresh().await);
        assert_eq!(app.model().lines, vec![NO_TASKS]);
    }

    #[tokio::test]
    async fn test_connection_error_replaces_the_list() {
        let config = write_config("Work");
        let server = server_with_tasks();
        let mut app = AppState::new(server.clone(), config.path());
        assert!(app.refresh().await);
        assert!(app.select(1));

        server.set_behaviour(MockBehaviour::fail_now(1));
        assert!(app.refresh().await == false);
        assert_eq!(app.model().lines.len(), 1);
        assert!(app.model().lines[0].starts_with("Error: Mocked behaviour"));
        assert_eq!(app.model().selection, None);
        assert!(app.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_select() {
        let config = write_config("Work");
        let mut app = AppState::new(server_with_tasks(), config.path());
        assert!(app.select(0) == false);

        app.refresh().await;
        assert!(app.select(1));
        assert_eq!(app.selected_task().unwrap().summary(), "Call the plumber");
        assert!(app.select(2) == false);
        assert_eq!(app.model().selection, Some(1));

        app.refresh().await;
        assert_eq!(app.model().selection, None);
    }

    #[tokio::test]
    async fn test_complete_selected() {
        let config = write_config("Work");
        let server = server_with_tasks();
        let mut app = AppState::new(server.clone(), config.path());
        app.refresh().await;

        app.complete_selected().await;
        assert_eq!(app.model().status, NO_SELECTION);
        assert_eq!(server.sessions_opened(), 1);

        app.select(0);
        let id = app.selected_task().unwrap().id().clone();
        app.complete_selected().await;
        assert_eq!(app.model().status, "Task 'Write the report' completed.");
        assert_eq!(app.model().lines, vec!["Call the plumber"]);
        assert_eq!(server.task_status(&id), Some(TaskStatus::Completed));
        assert_eq!(server.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_failed_completion_keeps_the_list() {
        let config = write_config("Work");
        let server = server_with_tasks();
        let mut app = AppState::new(server.clone(), config.path());
        app.refresh().await;
        app.select(1);

        server.set_behaviour(MockBehaviour{ complete_task_behaviour: (0, 1), ..MockBehaviour::default() });
        app.complete_selected().await;
        assert!(app.model().status.starts_with("Error: Mocked behaviour requires this complete_task to fail"));
        assert_eq!(app.model().lines, vec!["Write the report", "Call the plumber"]);
        assert_eq!(app.model().selection, Some(1));
    }

    #[tokio::test]
    async fn test_timeout() {
        let config = write_config("Work");
        let server = server_with_tasks();
        server.set_latency(Duration::from_secs(10));
        let mut app = AppState::new(server.clone(), config.path())
            .with_timeout(Duration::from_millis(50));

        assert!(app.refresh().await == false);
        assert_eq!(app.model().lines, vec!["Error: Operation timed out after 0.05s"]);
        assert_eq!(server.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_feedback() {
        let config = write_config("Work");
        let (sender, receiver) = feedback_channel();
        let mut app = AppState::new(server_with_tasks(), config.path())
            .with_feedback(sender);

        app.refresh().await;
        assert_eq!(receiver.borrow().to_string(), "Success! Found 2 tasks.");
    }
}

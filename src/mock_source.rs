//! An in-memory CalDAV server, used to test the workflows without any network

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use url::Url;

use crate::calendar::{CalendarRef, SupportedComponents};
use crate::config::Configuration;
use crate::item::ItemId;
use crate::mock_behaviour::MockBehaviour;
use crate::task::{Task, TaskStatus};
use crate::traits::{CalDavError, CalDavSource, Connector};

const MOCK_SERVER_URL: &str = "https://mock.server/calendars/";

#[derive(Default)]
struct MockData {
    /// Calendars and their tasks, in the order they were added
    calendars: Vec<(CalendarRef, Vec<Task>)>,
    behaviour: MockBehaviour,
    /// How long every call on a session takes
    latency: Option<Duration>,

    open_sessions: usize,
    sessions_opened: usize,
    n_tasks: usize,
}

/// A fake server. Every clone shares the same data.
///
/// As a [`Connector`], it hands out [`MockSession`]s, and keeps track of how many of them are still open.
#[derive(Clone, Default)]
pub struct MockSource {
    data: Arc<Mutex<MockData>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a calendar that supports tasks
    pub fn add_calendar(&self, name: &str) -> CalendarRef {
        self.add_calendar_with_components(name, SupportedComponents::TODO)
    }

    pub fn add_calendar_with_components(&self, name: &str, supported_components: SupportedComponents) -> CalendarRef {
        let mut data = self.data.lock().unwrap();
        let url = Url::parse(MOCK_SERVER_URL).unwrap()
            .join(&format!("{}/", data.calendars.len()))
            .unwrap();
        let calendar = CalendarRef::new(name.to_string(), url, supported_components);
        data.calendars.push((calendar.clone(), Vec::new()));
        calendar
    }

    /// Add a task at the end of a calendar
    pub fn add_task(&self, calendar: &CalendarRef, summary: &str, status: TaskStatus) -> Task {
        let mut data = self.data.lock().unwrap();
        data.n_tasks += 1;
        let uid = format!("mock-task-{}", data.n_tasks);
        let id = ItemId::from(calendar.id().join(&format!("{}.ics", uid)).unwrap());
        let completed_on = match status {
            TaskStatus::Completed => Some(Utc::now()),
            _ => None,
        };
        let ical = format!(
            "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//caldav-tasks//mock//EN\nBEGIN:VTODO\nUID:{}\nSUMMARY:{}\nSTATUS:{}\nEND:VTODO\nEND:VCALENDAR\n",
            uid, summary, status.as_ical());
        let task = Task::new(id, uid, summary.to_string(), status, completed_on, ical);

        let (_, tasks) = data.calendars.iter_mut()
            .find(|(cal, _)| cal.id() == calendar.id())
            .unwrap();
        tasks.push(task.clone());
        task
    }

    /// Change the way the next calls will behave
    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        self.data.lock().unwrap().behaviour = behaviour;
    }

    /// Make every call on the sessions take some time
    pub fn set_latency(&self, latency: Duration) {
        self.data.lock().unwrap().latency = Some(latency);
    }

    /// The status of a task, as currently stored on this server
    pub fn task_status(&self, id: &ItemId) -> Option<TaskStatus> {
        let data = self.data.lock().unwrap();
        data.calendars.iter()
            .flat_map(|(_, tasks)| tasks.iter())
            .find(|task| task.id() == id)
            .map(|task| task.status().clone())
    }

    /// The number of sessions that have been opened and not dropped yet
    pub fn open_sessions(&self) -> usize {
        self.data.lock().unwrap().open_sessions
    }

    /// The number of sessions that have been opened since this server exists
    pub fn sessions_opened(&self) -> usize {
        self.data.lock().unwrap().sessions_opened
    }
}

impl Connector for MockSource {
    type Source = MockSession;

    fn connect(&self, config: &Configuration) -> Result<MockSession, CalDavError> {
        let mut data = self.data.lock().unwrap();
        data.behaviour.can_connect()?;
        log::debug!("Opening a mocked session for {}", config.username);
        data.open_sessions += 1;
        data.sessions_opened += 1;

        Ok(MockSession { data: Arc::clone(&self.data) })
    }
}


/// A session opened on a [`MockSource`]
pub struct MockSession {
    data: Arc<Mutex<MockData>>,
}

impl MockSession {
    async fn wait(&self) {
        let latency = self.data.lock().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if let Ok(mut data) = self.data.lock() {
            data.open_sessions -= 1;
        }
    }
}

#[async_trait]
impl CalDavSource for MockSession {
    async fn get_calendars(&self) -> Result<Vec<CalendarRef>, CalDavError> {
        self.wait().await;
        let mut data = self.data.lock().unwrap();
        data.behaviour.can_get_calendars()?;
        Ok(data.calendars.iter().map(|(cal, _)| cal.clone()).collect())
    }

    async fn get_incomplete_tasks(&self, calendar: &CalendarRef) -> Result<Vec<Task>, CalDavError> {
        self.wait().await;
        let mut data = self.data.lock().unwrap();
        data.behaviour.can_get_incomplete_tasks()?;
        match data.calendars.iter().find(|(cal, _)| cal.id() == calendar.id()) {
            None => Err(format!("No calendar at {}", calendar.id()).into()),
            Some((_, tasks)) => Ok(tasks.iter().filter(|task| task.needs_action()).cloned().collect()),
        }
    }

    async fn complete_task(&self, task: &Task) -> Result<(), CalDavError> {
        self.wait().await;
        let mut data = self.data.lock().unwrap();
        data.behaviour.can_complete_task()?;
        let stored = data.calendars.iter_mut()
            .flat_map(|(_, tasks)| tasks.iter_mut())
            .find(|stored| stored.id() == task.id());
        match stored {
            None => Err(format!("No task at {}", task.id()).into()),
            Some(stored) => {
                *stored = stored.with_status(TaskStatus::Completed, Some(Utc::now()));
                Ok(())
            },
        }
    }
}

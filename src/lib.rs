//! This crate lists and completes the to-do items (`VTODO`) of a CalDAV calendar.
//!
//! It provides a CalDAV client in the [`client`] module, that talks to the server through the [`traits::CalDavSource`] seam.
//!
//! On top of it, the [`workflow`] module implements the two operations an app needs: fetching the incomplete tasks of a calendar (selected by its display name),
//! and marking one of them as completed. \
//! Credentials and the calendar name come from a `config.ini` file, see the [`config`] module. \
//! [`app::AppState`] ties these together into a render model that any front-end (e.g. the `caldav-tasks` binary) can display.

pub mod traits;

pub mod calendar;
pub use calendar::CalendarRef;
pub mod item;
pub use item::ItemId;
pub mod task;
pub use task::Task;
pub mod resource;
pub mod ical;

pub mod client;
pub mod config;
pub use config::Configuration;
pub mod progress;
pub mod workflow;
pub mod app;

pub mod utils;

#[cfg(any(test, feature = "integration_tests"))]
pub mod mock_behaviour;
#[cfg(any(test, feature = "integration_tests"))]
pub mod mock_source;

//! A module to build ICal files

use chrono::{DateTime, Utc};
use ical::generator::Emitter;
use ical::property::Property;

use crate::task::TaskStatus;
use crate::traits::CalDavError;

use super::format_date_time;

/// Properties that are replaced when a task is completed
const COMPLETION_PROPERTIES: [&str; 5] = ["STATUS", "COMPLETED", "PERCENT-COMPLETE", "LAST-MODIFIED", "DTSTAMP"];

/// Rewrite an iCal resource, so that its `VTODO` is marked as completed at `completed_on`.
///
/// Everything else (other properties, alarms, timezones...) is kept as is.
pub fn build_completed(ical_content: &str, completed_on: &DateTime<Utc>) -> Result<String, CalDavError> {
    let mut reader = ical::IcalParser::new(ical_content.as_bytes());
    let mut calendar = match reader.next() {
        None => return Err("No iCal data to update".into()),
        Some(Err(err)) => return Err(format!("Unable to parse iCal data: {}", err).into()),
        Some(Ok(cal)) => cal,
    };

    let todo = match calendar.todos.first_mut() {
        None => return Err("There is no VTODO to complete".into()),
        Some(todo) => todo,
    };

    let s_now = format_date_time(completed_on);
    todo.properties.retain(|prop| {
        COMPLETION_PROPERTIES.iter().any(|replaced| prop.name.eq_ignore_ascii_case(replaced)) == false
    });
    todo.properties.push(property("DTSTAMP", &s_now));
    todo.properties.push(property("LAST-MODIFIED", &s_now));
    todo.properties.push(property("STATUS", TaskStatus::Completed.as_ical()));
    todo.properties.push(property("COMPLETED", &s_now));
    todo.properties.push(property("PERCENT-COMPLETE", "100"));

    Ok(calendar.generate())
}

fn property(name: &str, value: &str) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value.to_string()),
    }
}

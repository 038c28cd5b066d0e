//! A module to parse ICal files

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use ical::parser::ical::component::{IcalCalendar, IcalTodo};

use crate::item::ItemId;
use crate::task::{Task, TaskStatus};
use crate::traits::CalDavError;


/// Parse an iCal file into a [`Task`]
///
/// This fails in case the content is not valid iCal, does not contain a `VTODO`, or this `VTODO` has no `SUMMARY`.
pub fn parse(content: &str, item_id: ItemId) -> Result<Task, CalDavError> {
    let mut reader = ical::IcalParser::new(content.as_bytes());
    let parsed_item = match reader.next() {
        None => return Err(format!("Invalid iCal data to parse for item {}", item_id).into()),
        Some(item) => match item {
            Err(err) => return Err(format!("Unable to parse iCal data for item {}: {}", item_id, err).into()),
            Ok(item) => item,
        }
    };

    // What to do with multiple items?
    if reader.next().map(|r| r.is_ok()) == Some(true) {
        return Err(format!("Parsing multiple items is not supported (item {})", item_id).into());
    }

    let todo = single_todo(&parsed_item)
        .ok_or_else(|| format!("Item {} is not a single VTODO", item_id))?;

    let summary = match property_value(todo, "SUMMARY") {
        Some(summary) => unescape_text(summary),
        None => return Err(format!("Missing summary for item {}", item_id).into()),
    };
    let uid = match property_value(todo, "UID") {
        Some(uid) => uid.to_string(),
        None => {
            log::debug!("Item {} has no UID", item_id);
            String::new()
        },
    };

    let completed_on = property_value(todo, "COMPLETED").and_then(parse_date_time);
    let status = match property_value(todo, "STATUS") {
        Some(status) => TaskStatus::from_ical(status),
        None => {
            // RFC5545 has no default status. Most clients consider such a task as still to do, unless it has a completion date
            if property_value(todo, "COMPLETED").is_some() {
                TaskStatus::Completed
            } else {
                TaskStatus::NeedsAction
            }
        },
    };

    Ok(Task::new(item_id, uid, summary, status, completed_on, content.to_string()))
}

/// Returns the first `VTODO` of a calendar that contains nothing else.
///
/// Several `VTODO`s are accepted as long as they are all about the same task (recurrence overrides are ignored, though)
fn single_todo(item: &IcalCalendar) -> Option<&IcalTodo> {
    if item.events.is_empty() == false || item.journals.is_empty() == false {
        return None;
    }
    item.todos.first()
}

fn property_value<'a>(todo: &'a IcalTodo, name: &str) -> Option<&'a str> {
    todo.properties.iter()
        .find(|prop| prop.name.eq_ignore_ascii_case(name))
        .and_then(|prop| prop.value.as_deref())
}

/// Parse a date-time value (`YYYYMMDDTHHMMSSZ`, or a floating `YYYYMMDDTHHMMSS` that is assumed to be UTC)
fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let naive = NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S"))
        .ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Revert the escaping RFC5545 applies to TEXT values
fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

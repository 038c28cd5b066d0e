//! CalDAV calendars, as seen from the principal's calendar home set

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use bitflags::bitflags;
use url::Url;

use crate::traits::CalDavError;

bitflags! {
    pub struct SupportedComponents: u8 {
        /// An event, such as a calendar meeting
        const EVENT = 1;
        /// A to-do item, such as a reminder
        const TODO = 2;
    }
}

impl TryFrom<&minidom::Element> for SupportedComponents {
    type Error = CalDavError;

    /// Create an instance from an XML <supported-calendar-component-set> element
    fn try_from(element: &minidom::Element) -> Result<Self, Self::Error> {
        if element.name() != "supported-calendar-component-set" {
            return Err("Element must be a <supported-calendar-component-set>".into());
        }

        let mut flags = Self::empty();
        for child in element.children() {
            match child.attr("name") {
                None => continue,
                Some("VEVENT") => flags.insert(Self::EVENT),
                Some("VTODO") => flags.insert(Self::TODO),
                Some(other) => {
                    log::debug!("Unimplemented supported component type: {:?}. Ignoring it", other);
                    continue
                },
            };
        }

        Ok(flags)
    }
}


pub type CalendarId = Url;

/// A calendar, as listed by a [`CalDavSource`](crate::traits::CalDavSource).
///
/// Its display name is what users pick it by. It is not guaranteed to be unique.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarRef {
    name: String,
    id: CalendarId,
    supported_components: SupportedComponents,
}

impl CalendarRef {
    pub fn new(name: String, id: CalendarId, supported_components: SupportedComponents) -> Self {
        Self { name, id, supported_components }
    }

    /// Returns the display name
    pub fn name(&self) -> &str { &self.name }
    /// Returns the URL of the calendar collection
    pub fn id(&self) -> &CalendarId { &self.id }
    pub fn supported_components(&self) -> SupportedComponents { self.supported_components }

    /// Returns whether this calendar supports to-do items
    pub fn supports_todo(&self) -> bool {
        self.supported_components.contains(SupportedComponents::TODO)
    }
}

impl Display for CalendarRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}


/// Find the first calendar whose display name is exactly `name`.
///
/// The match is case-sensitive, and the first one in `calendars` order wins in case of duplicates.
pub fn find_by_name<'a>(calendars: &'a [CalendarRef], name: &str) -> Option<&'a CalendarRef> {
    let found = calendars.iter().find(|cal| cal.name() == name);

    if found.is_none() {
        if let Some(close) = calendars.iter().find(|cal| cal.name().to_lowercase() == name.to_lowercase()) {
            log::info!("No calendar named {:?}, but there is a calendar named {:?} (names are case-sensitive)", name, close.name());
        }
    }
    found
}


#[cfg(test)]
mod tests {
    use super::*;

    fn cal(name: &str, path: &str) -> CalendarRef {
        let url = Url::parse("https://caldav.example.com/").unwrap().join(path).unwrap();
        CalendarRef::new(name.to_string(), url, SupportedComponents::TODO)
    }

    #[test]
    fn test_supported_components() {
        let xml = r#"<c:supported-calendar-component-set xmlns:c="urn:ietf:params:xml:ns:caldav">
            <c:comp name="VEVENT"/>
            <c:comp name="VTODO"/>
            <c:comp name="VJOURNAL"/>
        </c:supported-calendar-component-set>"#;
        let el: minidom::Element = xml.parse().unwrap();
        let comps = SupportedComponents::try_from(&el).unwrap();
        assert_eq!(comps, SupportedComponents::EVENT | SupportedComponents::TODO);

        let wrong: minidom::Element = r#"<d:prop xmlns:d="DAV:"/>"#.parse().unwrap();
        assert!(SupportedComponents::try_from(&wrong).is_err());
    }

    #[test]
    fn test_find_by_name_is_case_sensitive() {
        let cals = vec![cal("work", "/cals/w1/"), cal("Home", "/cals/h/")];
        assert!(find_by_name(&cals, "Work").is_none());
        assert_eq!(find_by_name(&cals, "work").unwrap().id().path(), "/cals/w1/");
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let cals = vec![cal("Home", "/cals/h/"), cal("Work", "/cals/w1/"), cal("Work", "/cals/w2/")];
        for _ in 0..3 {
            assert_eq!(find_by_name(&cals, "Work").unwrap().id().path(), "/cals/w1/");
        }
    }
}

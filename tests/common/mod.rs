//! A fake CalDAV server, built on wiremock
#![allow(dead_code)]

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PRINCIPAL_PATH: &str = "/principals/users/john/";
pub const HOME_SET_PATH: &str = "/calendars/john/";
pub const WORK_PATH: &str = "/calendars/john/work/";

/// A 207 reply, that contains the given `<d:response>`s
pub fn multistatus(responses: &str) -> ResponseTemplate {
    let body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav">{}</d:multistatus>"#,
        responses);
    ResponseTemplate::new(207)
        .insert_header("Content-Type", "application/xml; charset=utf-8")
        .set_body_string(body)
}

/// A single `VTODO` resource. Properties that are `None` are omitted
pub fn vtodo(uid: &str, summary: Option<&str>, status: Option<&str>) -> String {
    let mut ical = format!("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Nextcloud Tasks v0.13.6\nBEGIN:VTODO\nUID:{}\nDTSTAMP:20210321T001600\n", uid);
    if let Some(summary) = summary {
        ical.push_str(&format!("SUMMARY:{}\n", summary));
    }
    if let Some(status) = status {
        ical.push_str(&format!("STATUS:{}\n", status));
    }
    ical.push_str("END:VTODO\nEND:VCALENDAR\n");
    ical
}

/// A `<d:response>` for an item of a calendar-query REPORT
pub fn item_response(href: &str, ical: Option<&str>) -> String {
    let data = match ical {
        Some(ical) => format!("<cal:calendar-data>{}</cal:calendar-data>", ical),
        None => String::new(),
    };
    format!(
        r#"<d:response><d:href>{}</d:href><d:propstat><d:prop><d:getetag>"1234"</d:getetag>{}</d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
        href, data)
}

fn calendar_response(href: &str, name: &str, components: Option<&[&str]>) -> String {
    let supported = match components {
        None => String::new(),
        Some(comps) => {
            let comps: String = comps.iter().map(|c| format!(r#"<cal:comp name="{}"/>"#, c)).collect();
            format!("<cal:supported-calendar-component-set>{}</cal:supported-calendar-component-set>", comps)
        },
    };
    format!(
        r#"<d:response><d:href>{}</d:href><d:propstat><d:prop><d:displayname>{}</d:displayname><d:resourcetype><d:collection/><cal:calendar/></d:resourcetype>{}</d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
        href, name, supported)
}

/// Start a server that answers the principal and calendar home set discovery, and lists these calendars:
/// * `Work` (tasks only)
/// * `Events` (events only)
/// * `Personal` (no supported component set)
pub async fn dav_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/"))
        .and(body_string_contains("current-user-principal"))
        .respond_with(multistatus(&format!(
            r#"<d:response><d:href>/</d:href><d:propstat><d:prop><d:current-user-principal><d:href>{}</d:href></d:current-user-principal></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
            PRINCIPAL_PATH)))
        .mount(&server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path(PRINCIPAL_PATH))
        .and(body_string_contains("calendar-home-set"))
        .respond_with(multistatus(&format!(
            r#"<d:response><d:href>{}</d:href><d:propstat><d:prop><cal:calendar-home-set><d:href>{}</d:href></cal:calendar-home-set></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
            PRINCIPAL_PATH, HOME_SET_PATH)))
        .mount(&server)
        .await;

    let calendars = vec![
        // The home set itself is a collection, not a calendar
        format!(r#"<d:response><d:href>{}</d:href><d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#, HOME_SET_PATH),
        calendar_response(WORK_PATH, "Work", Some(&["VTODO"])),
        calendar_response("/calendars/john/events/", "Events", Some(&["VEVENT"])),
        calendar_response("/calendars/john/personal/", "Personal", None),
    ];
    Mock::given(method("PROPFIND"))
        .and(path(HOME_SET_PATH))
        .respond_with(multistatus(&calendars.concat()))
        .mount(&server)
        .await;

    server
}

/// Make the `Work` calendar contain these items
pub async fn mount_work_items(server: &MockServer, items: &[String]) {
    Mock::given(method("REPORT"))
        .and(path(WORK_PATH))
        .and(body_string_contains("VTODO"))
        .respond_with(multistatus(&items.concat()))
        .mount(server)
        .await;
}

/// The content of a `config.ini` that targets `server`
pub fn config_ini(server: &MockServer, calendar_name: &str) -> String {
    format!("[caldav]\nurl = {}/\nusername = john\npassword = secret\ncalendar_name = {}\n", server.uri(), calendar_name)
}

//! This module provides a client to connect to a CalDAV server

use std::convert::TryFrom;

use async_trait::async_trait;
use chrono::Utc;
use minidom::Element;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::OnceCell;
use url::Url;

use crate::calendar::{CalendarRef, SupportedComponents};
use crate::config::Configuration;
use crate::item::ItemId;
use crate::resource::Resource;
use crate::task::Task;
use crate::traits::{CalDavError, CalDavSource, Connector};
use crate::utils::{find_elem, find_elems, find_text_at};


static DAVCLIENT_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:">
       <d:prop>
           <d:current-user-principal />
       </d:prop>
    </d:propfind>
"#;

static HOMESET_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" >
      <d:self/>
      <d:prop>
        <c:calendar-home-set />
      </d:prop>
    </d:propfind>
"#;

static CAL_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" >
       <d:prop>
         <d:displayname />
         <d:resourcetype />
         <c:supported-calendar-component-set />
       </d:prop>
    </d:propfind>
"#;

static TASKS_BODY: &str = r#"
    <C:calendar-query xmlns:C="urn:ietf:params:xml:ns:caldav">
    <D:prop xmlns:D="DAV:">
        <D:getetag/>
        <C:calendar-data/>
    </D:prop>
    <C:filter>
        <C:comp-filter name="VCALENDAR">
        <C:comp-filter name="VTODO">
            <C:prop-filter name="COMPLETED">
            <C:is-not-defined/>
            </C:prop-filter>
        </C:comp-filter>
        </C:comp-filter>
    </C:filter>
    </C:calendar-query>
"#;


/// A session on a CalDAV server.
///
/// Creating a client does not start a connection. The principal and the calendar home set are discovered on first use, and kept for the life of this session.
pub struct Client {
    resource: Resource,
    http: reqwest::Client,

    principal: OnceCell<Resource>,
    calendar_home_set: OnceCell<Resource>,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString, U: ToString>(url: S, username: T, password: U) -> Result<Self, CalDavError> {
        let url = Url::parse(url.as_ref())?;
        let http = reqwest::Client::builder().build()?;
        log::debug!("Opening a CalDAV session to {}", url);

        Ok(Self{
            resource: Resource::new(url, username.to_string(), password.to_string()),
            http,
            principal: OnceCell::new(),
            calendar_home_set: OnceCell::new(),
        })
    }

    async fn sub_request(&self, resource: &Resource, method: &str, body: String, depth: u32) -> Result<String, CalDavError> {
        let method = Method::from_bytes(method.as_bytes())?;

        let res = self.http
            .request(method, resource.url().clone())
            .header("Depth", depth)
            .header(CONTENT_TYPE, "application/xml")
            .basic_auth(resource.username(), Some(resource.password()))
            .body(body)
            .send()
            .await?;

        if res.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {} for {}", res.status(), resource.url()).into());
        }

        let text = res.text().await?;
        Ok(text)
    }

    async fn sub_request_and_extract_elem(&self, resource: &Resource, body: String, items: &[&str]) -> Result<String, CalDavError> {
        let text = self.sub_request(resource, "PROPFIND", body, 0).await?;

        let root = parse_xml(&text)?;
        find_text_at(&root, items)
            .ok_or_else(|| format!("No {} in the reply from {}", items.join("/"), resource.url()).into())
    }

    /// Return the Principal URL, or fetch it from server if not known yet
    async fn get_principal(&self) -> Result<&Resource, CalDavError> {
        self.principal.get_or_try_init(|| async {
            let href = self.sub_request_and_extract_elem(&self.resource, DAVCLIENT_BODY.into(), &["current-user-principal", "href"]).await?;
            log::debug!("Principal URL is {}", href);
            Ok::<_, CalDavError>(self.resource.combine(&href)?)
        }).await
    }

    /// Return the Homeset URL, or fetch it from server if not known yet
    async fn get_cal_home_set(&self) -> Result<&Resource, CalDavError> {
        self.calendar_home_set.get_or_try_init(|| async {
            let principal = self.get_principal().await?;

            let href = self.sub_request_and_extract_elem(principal, HOMESET_BODY.into(), &["calendar-home-set", "href"]).await?;
            let chs = self.resource.combine(&href)?;
            log::debug!("Calendar home set URL is {:?}", chs.url().path());
            Ok::<_, CalDavError>(chs)
        }).await
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        log::debug!("Closing the CalDAV session to {}", self.resource.url());
    }
}

#[async_trait]
impl CalDavSource for Client {
    async fn get_calendars(&self) -> Result<Vec<CalendarRef>, CalDavError> {
        let cal_home_set = self.get_cal_home_set().await?;

        let text = self.sub_request(cal_home_set, "PROPFIND", CAL_BODY.into(), 1).await?;

        let root = parse_xml(&text)?;
        let reps = find_elems(&root, "response");
        let mut calendars = Vec::new();
        for rep in reps {
            let display_name = find_elem(rep, "displayname").map(|e| e.text().trim().to_string()).unwrap_or_default();
            log::debug!("Considering calendar {}", display_name);

            // We filter out non-calendar items
            let is_calendar = match find_elem(rep, "resourcetype") {
                None => false,
                Some(rt) => rt.children().any(|resource_type| resource_type.name() == "calendar"),
            };
            if is_calendar == false {
                continue;
            }

            // No supported-calendar-component-set means every component is supported
            let supported_components = match find_elem(rep, "supported-calendar-component-set") {
                None => SupportedComponents::all(),
                Some(el) => match SupportedComponents::try_from(el) {
                    Err(err) => {
                        log::warn!("Calendar {} has invalid supported components ({})! Ignoring it.", display_name, err);
                        continue;
                    },
                    Ok(sc) => sc,
                },
            };

            let calendar_href = match find_elem(rep, "href") {
                None => {
                    log::warn!("Calendar {} has no URL! Ignoring it.", display_name);
                    continue;
                },
                Some(h) => h.text(),
            };
            let this_calendar_url = cal_home_set.combine(calendar_href.trim())?.url().clone();

            let this_calendar = CalendarRef::new(display_name, this_calendar_url, supported_components);
            log::info!("Found calendar {}", this_calendar.name());
            calendars.push(this_calendar);
        }

        Ok(calendars)
    }

    async fn get_incomplete_tasks(&self, calendar: &CalendarRef) -> Result<Vec<Task>, CalDavError> {
        let cal_resource = self.resource.combine(calendar.id().as_str())?;
        let text = self.sub_request(&cal_resource, "REPORT", TASKS_BODY.into(), 1).await?;

        let root = parse_xml(&text)?;
        let responses = find_elems(&root, "response");

        let mut tasks = Vec::new();
        for response in responses {
            let item_id = match find_elem(response, "href").map(|elem| cal_resource.combine(elem.text().trim())) {
                Some(Ok(resource)) => ItemId::from(&resource),
                _ => {
                    log::warn!("Unable to extract HREF");
                    continue;
                },
            };

            let ical_data = match find_elem(response, "calendar-data") {
                None => {
                    log::debug!("No calendar data for item {}, ignoring it", item_id);
                    continue;
                },
                Some(data) => data.text(),
            };

            let task = match crate::ical::parse(&ical_data, item_id) {
                Err(err) => {
                    log::debug!("Ignoring an item: {}", err);
                    continue;
                },
                Ok(task) => task,
            };
            // The query does not filter on STATUS, so that tasks without one are returned too
            if task.needs_action() == false {
                log::debug!("Task {} has status {}, ignoring it", task.summary(), task.status());
                continue;
            }
            tasks.push(task);
        }

        log::debug!("Found {} incomplete tasks in calendar {}", tasks.len(), calendar.name());
        Ok(tasks)
    }

    async fn complete_task(&self, task: &Task) -> Result<(), CalDavError> {
        let ical_text = crate::ical::build_completed(task.ical(), &Utc::now())?;

        let response = self.http
            .put(task.id().as_url().clone())
            .header(CONTENT_TYPE, "text/calendar; charset=utf-8")
            .basic_auth(self.resource.username(), Some(self.resource.password()))
            .body(ical_text)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {} while saving {}", response.status(), task.id()).into());
        }

        log::info!("Task {} marked as completed", task.summary());
        Ok(())
    }
}

fn parse_xml(text: &str) -> Result<Element, CalDavError> {
    text.parse()
        .map_err(|err| format!("Invalid XML reply from the server: {}", err).into())
}


/// Opens [`Client`] sessions
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientConnector;

impl Connector for ClientConnector {
    type Source = Client;

    fn connect(&self, config: &Configuration) -> Result<Client, CalDavError> {
        Client::new(&config.server_url, &config.username, &config.password)
    }
}

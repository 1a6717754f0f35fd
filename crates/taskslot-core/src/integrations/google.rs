//! Google Calendar integration.
//!
//! Reads busy time from every calendar on the user's calendar list and
//! writes placed segments into one target calendar (`primary` by default).
//! Authentication is the caller's concern: this client takes an already
//! issued OAuth access token.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use super::traits::CalendarProvider;
use crate::error::CalendarError;
use crate::timeline::Interval;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

const EVENT_DESCRIPTION: &str = "Scheduled automatically by taskslot";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_PAGES: usize = 100;

/// Google Calendar v3 client.
pub struct GoogleCalendar {
    access_token: String,
    base_url: String,
    calendar_id: String,
    /// Offset used to expand all-day events into concrete instants.
    offset: FixedOffset,
    client: Client,
    runtime: Runtime,
}

impl GoogleCalendar {
    /// Create a client for `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotAuthenticated`] for an empty token and
    /// [`CalendarError::Runtime`] if the blocking runtime cannot start.
    pub fn new(access_token: impl Into<String>) -> Result<Self, CalendarError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(CalendarError::NotAuthenticated {
                service: "google".to_string(),
            });
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CalendarError::Runtime(e.to_string()))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            calendar_id: "primary".to_string(),
            offset: Utc.fix(),
            client,
            runtime,
        })
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, CalendarError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|_| CalendarError::InvalidEndpoint(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CalendarError::InvalidEndpoint(base_url.to_string()));
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Calendar that new events are inserted into.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Local offset for all-day events.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    fn get_json(&self, url: &str) -> Result<Value, CalendarError> {
        let resp = self.runtime.block_on(async {
            let resp = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .send()
                .await?;
            let status = resp.status().as_u16();
            let body: Value = resp.json().await?;
            Ok::<_, reqwest::Error>((status, body))
        })?;
        check_response(resp)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, CalendarError> {
        let resp = self.runtime.block_on(async {
            let resp = self
                .client
                .post(url)
                .bearer_auth(&self.access_token)
                .json(body)
                .send()
                .await?;
            let status = resp.status().as_u16();
            let body: Value = resp.json().await?;
            Ok::<_, reqwest::Error>((status, body))
        })?;
        check_response(resp)
    }

    /// Every `items` entry of a paged listing, following `nextPageToken`.
    fn list_all(&self, url: &str, params: &[(&str, String)]) -> Result<Vec<Value>, CalendarError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query: Vec<String> = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            if let Some(token) = &page_token {
                query.push(format!("pageToken={}", urlencoding::encode(token)));
            }
            let page_url = if query.is_empty() {
                url.to_string()
            } else {
                format!("{}?{}", url, query.join("&"))
            };

            let resp = self.get_json(&page_url)?;
            if let Some(page) = resp["items"].as_array() {
                items.extend(page.iter().cloned());
            }

            page_token = resp["nextPageToken"].as_str().map(str::to_string);
            if page_token.is_none() {
                return Ok(items);
            }
        }

        warn!(url, pages = MAX_PAGES, "listing still paging, keeping what was read");
        Ok(items)
    }

    /// `(id, summary)` of every calendar on the user's list.
    fn calendar_ids(&self) -> Result<Vec<(String, String)>, CalendarError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let items = self.list_all(&url, &[])?;
        Ok(calendar_ids_in_list(&items))
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<Value>, CalendarError> {
        let params = [
            ("timeMin", window_start.to_rfc3339()),
            ("timeMax", window_end.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", "250".to_string()),
        ];
        self.list_all(&self.events_url(calendar_id), &params)
    }
}

impl CalendarProvider for GoogleCalendar {
    fn name(&self) -> &str {
        "google"
    }

    fn fetch_busy_intervals(
        &self,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<Interval>, CalendarError> {
        let calendars = self.calendar_ids()?;
        let mut busy = Vec::new();

        for (id, summary) in calendars {
            debug!(calendar = %summary, "reading events");
            match self.list_events(&id, window_start, window_end) {
                Ok(items) => busy.extend(busy_intervals_from_events(&items, self.offset)),
                Err(e) => warn!(calendar = %summary, error = %e, "skipping unreadable calendar"),
            }
        }

        busy.sort_by_key(|i: &Interval| (i.start(), i.end()));
        info!(count = busy.len(), "fetched busy intervals");
        Ok(busy)
    }

    fn create_event(&self, title: &str, interval: &Interval) -> Result<(), CalendarError> {
        let body = event_body(title, interval);
        let url = self.events_url(&self.calendar_id);

        match self.post_json(&url, &body) {
            Ok(created) => {
                debug!(
                    id = created["id"].as_str().unwrap_or_default(),
                    title, "created calendar event"
                );
                Ok(())
            }
            Err(CalendarError::Api { status, message }) => Err(CalendarError::WriteRejected {
                title: title.to_string(),
                message: format!("{status}: {message}"),
            }),
            Err(e) => Err(e),
        }
    }
}

fn check_response((status, body): (u16, Value)) -> Result<Value, CalendarError> {
    if let Some(err) = body.get("error") {
        let message = err["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(CalendarError::Api { status, message });
    }
    if !(200..300).contains(&status) {
        return Err(CalendarError::Api {
            status,
            message: body.to_string(),
        });
    }
    Ok(body)
}

/// `(id, summary)` for each `calendarList` entry.
pub fn calendar_ids_in_list(items: &[Value]) -> Vec<(String, String)> {
    items
        .iter()
        .filter_map(|cal| {
            let id = cal["id"].as_str()?;
            let summary = cal["summary"].as_str().unwrap_or(id);
            Some((id.to_string(), summary.to_string()))
        })
        .collect()
}

/// Convert an `events` listing into busy intervals.
///
/// Transparent ("free") events are skipped. All-day events cover whole local
/// days in `offset`. Malformed entries are logged and dropped.
pub fn busy_intervals_from_events(items: &[Value], offset: FixedOffset) -> Vec<Interval> {
    items
        .iter()
        .filter(|item| item["transparency"].as_str() != Some("transparent"))
        .filter_map(|item| match event_interval(item, offset) {
            Ok(interval) => Some(interval),
            Err(e) => {
                warn!(error = %e, "ignoring calendar event");
                None
            }
        })
        .collect()
}

fn event_interval(item: &Value, offset: FixedOffset) -> Result<Interval, CalendarError> {
    let summary = item["summary"].as_str().unwrap_or("(No title)");
    let malformed = |message: &str| CalendarError::MalformedEvent {
        summary: summary.to_string(),
        message: message.to_string(),
    };

    if let Some(start) = item["start"]["dateTime"].as_str() {
        let end = item["end"]["dateTime"]
            .as_str()
            .ok_or_else(|| malformed("missing end time"))?;
        let start = DateTime::parse_from_rfc3339(start)
            .map_err(|_| malformed("invalid start time format"))?;
        let end =
            DateTime::parse_from_rfc3339(end).map_err(|_| malformed("invalid end time format"))?;
        return Interval::new(start.with_timezone(&offset), end.with_timezone(&offset))
            .map_err(|e| malformed(&e.to_string()));
    }

    let start_date = all_day_date(item, "start")
        .ok_or_else(|| malformed("missing start time"))?
        .map_err(|_| malformed("invalid all-day date"))?;
    // The end date is exclusive; a missing one means a single day.
    let end_date = match all_day_date(item, "end") {
        Some(date) => date.map_err(|_| malformed("invalid all-day end date"))?,
        None => start_date + Duration::days(1),
    };
    let local_midnight = |date: NaiveDate| {
        offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .ok_or_else(|| malformed("all-day date out of range"))
    };
    Interval::new(local_midnight(start_date)?, local_midnight(end_date)?)
        .map_err(|e| malformed(&e.to_string()))
}

fn all_day_date(item: &Value, field: &str) -> Option<Result<NaiveDate, chrono::ParseError>> {
    item[field]["date"]
        .as_str()
        .map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
}

/// Request body for inserting one event.
pub fn event_body(title: &str, interval: &Interval) -> Value {
    json!({
        "summary": title,
        "description": EVENT_DESCRIPTION,
        "start": { "dateTime": interval.start().to_rfc3339() },
        "end": { "dateTime": interval.end().to_rfc3339() },
    })
}

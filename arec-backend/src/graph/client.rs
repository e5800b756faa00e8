//! Calendar and mail queries against Microsoft Graph

use super::{GraphAuth, GRAPH_BASE};
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

const EVENT_SELECT: &str = "subject,start,end,location,organizer,attendees,bodyPreview,isAllDay";
const EMAIL_SELECT: &str = "subject,from,receivedDateTime,bodyPreview,hasAttachments,isRead";
const EVENT_TOP: u32 = 25;
const ATTENDEE_CAP: usize = 8;
const EVENT_PREVIEW_CAP: usize = 200;
const EMAIL_PREVIEW_CAP: usize = 300;

/// One calendar event, times already formatted for display.
/// The past/current flags start false; the dashboard page fills them in.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    /// Start instant, kept for ordering and the past/current split
    pub start_at: DateTime<Local>,
    pub location: String,
    pub organizer: String,
    pub attendees: Vec<String>,
    pub preview: String,
    pub is_all_day: bool,
    pub is_past: bool,
    pub is_current: bool,
}

/// One inbox message
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub from_name: String,
    pub from_email: String,
    pub received: String,
    pub preview: String,
    pub has_attachments: bool,
    pub is_read: bool,
}

#[derive(Debug, Deserialize)]
struct GraphList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDateTime {
    date_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEmailAddress {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecipient {
    #[serde(default)]
    email_address: Option<WireEmailAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLocation {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(default)]
    subject: Option<String>,
    start: WireDateTime,
    end: WireDateTime,
    #[serde(default)]
    location: Option<WireLocation>,
    #[serde(default)]
    organizer: Option<WireRecipient>,
    #[serde(default)]
    attendees: Vec<WireRecipient>,
    #[serde(default)]
    body_preview: Option<String>,
    #[serde(default)]
    is_all_day: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default, rename = "from")]
    sender: Option<WireRecipient>,
    received_date_time: String,
    #[serde(default)]
    body_preview: Option<String>,
    #[serde(default)]
    has_attachments: bool,
    #[serde(default)]
    is_read: Option<bool>,
}

/// Parse a Graph datetime string. Graph emits seven fractional digits, which
/// chrono rejects, so the fraction is trimmed to six first. Values are UTC
/// and come back converted to local time.
fn parse_graph_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let trimmed = s.trim_end_matches('Z');
    let normalized = match trimmed.split_once('.') {
        Some((base, frac)) => format!("{}.{}", base, &frac[..frac.len().min(6)]),
        None => trimmed.to_string(),
    };
    let naive = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("Invalid Graph datetime {}: {}", s, e))?;
    Ok(Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

fn recipient_name(recipient: &Option<WireRecipient>) -> String {
    recipient
        .as_ref()
        .and_then(|r| r.email_address.as_ref())
        .and_then(|a| a.name.clone())
        .unwrap_or_default()
}

fn recipient_address(recipient: &Option<WireRecipient>) -> String {
    recipient
        .as_ref()
        .and_then(|r| r.email_address.as_ref())
        .and_then(|a| a.address.clone())
        .unwrap_or_default()
}

fn event_from_wire(e: WireEvent) -> Result<CalendarEvent, String> {
    let start_at = parse_graph_datetime(&e.start.date_time)?;
    let end_at = parse_graph_datetime(&e.end.date_time)?;

    let attendees: Vec<String> = e
        .attendees
        .iter()
        .filter_map(|a| a.email_address.as_ref())
        .map(|addr| {
            addr.name
                .clone()
                .or_else(|| addr.address.clone())
                .unwrap_or_default()
        })
        .take(ATTENDEE_CAP)
        .collect();

    Ok(CalendarEvent {
        title: e.subject.unwrap_or_else(|| "Untitled".to_string()),
        start: start_at.format("%-I:%M %p").to_string(),
        end: end_at.format("%-I:%M %p").to_string(),
        start_at,
        location: e
            .location
            .and_then(|l| l.display_name)
            .unwrap_or_default(),
        organizer: recipient_name(&e.organizer),
        attendees,
        preview: e
            .body_preview
            .unwrap_or_default()
            .chars()
            .take(EVENT_PREVIEW_CAP)
            .collect(),
        is_all_day: e.is_all_day,
        is_past: false,
        is_current: false,
    })
}

fn email_from_wire(m: WireMessage) -> Result<EmailMessage, String> {
    let received = parse_graph_datetime(&m.received_date_time)?;
    let from_name = {
        let name = recipient_name(&m.sender);
        if name.is_empty() {
            "Unknown".to_string()
        } else {
            name
        }
    };

    Ok(EmailMessage {
        subject: m.subject.unwrap_or_else(|| "(no subject)".to_string()),
        from_name,
        from_email: recipient_address(&m.sender),
        received: received.format("%-I:%M %p").to_string(),
        preview: m
            .body_preview
            .unwrap_or_default()
            .chars()
            .take(EMAIL_PREVIEW_CAP)
            .collect(),
        has_attachments: m.has_attachments,
        is_read: m.is_read.unwrap_or(true),
    })
}

pub struct GraphClient {
    client: Client,
    auth: GraphAuth,
    user_id: String,
}

impl GraphClient {
    pub fn new(auth: GraphAuth, user_id: String) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            auth,
            user_id,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        params: &[(&str, String)],
    ) -> Result<T, String> {
        let token = self.auth.get_access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .map_err(|e| format!("Graph API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "Graph API returned error status: {}, body: {}",
                status, body
            ));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Graph response: {}", e))
    }

    /// Calendar events from local midnight through the lookahead window,
    /// sorted by start time.
    pub async fn get_todays_events(&self, days_ahead: i64) -> Result<Vec<CalendarEvent>, String> {
        let now = Local::now();
        let start = now
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or(now);
        let end = start + chrono::Duration::days(days_ahead);

        let url = format!("{}/users/{}/calendarView", GRAPH_BASE, self.user_id);
        let params = [
            ("startDateTime", start.to_rfc3339()),
            ("endDateTime", end.to_rfc3339()),
            ("$select", EVENT_SELECT.to_string()),
            ("$orderby", "start/dateTime".to_string()),
            ("$top", EVENT_TOP.to_string()),
        ];

        let data: GraphList<WireEvent> = self.get_json(url, &params).await?;
        let mut events = data
            .value
            .into_iter()
            .map(event_from_wire)
            .collect::<Result<Vec<CalendarEvent>, String>>()?;
        events.sort_by_key(|e| e.start_at);

        log::info!("[GRAPH] Fetched {} calendar events", events.len());
        Ok(events)
    }

    /// Inbox messages received inside the scan window, newest first as the
    /// API returns them.
    pub async fn get_recent_emails(
        &self,
        hours_back: i64,
        max_results: u32,
    ) -> Result<Vec<EmailMessage>, String> {
        let since = (Utc::now() - chrono::Duration::hours(hours_back))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();

        let url = format!(
            "{}/users/{}/mailFolders/Inbox/messages",
            GRAPH_BASE, self.user_id
        );
        let params = [
            ("$select", EMAIL_SELECT.to_string()),
            ("$orderby", "receivedDateTime desc".to_string()),
            ("$top", max_results.to_string()),
            (
                "$filter",
                format!("receivedDateTime ge {} and isDraft eq false", since),
            ),
        ];

        let data: GraphList<WireMessage> = self.get_json(url, &params).await?;
        let emails = data
            .value
            .into_iter()
            .map(email_from_wire)
            .collect::<Result<Vec<EmailMessage>, String>>()?;

        log::info!("[GRAPH] Fetched {} emails", emails.len());
        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_datetime_trims_seven_digit_fraction() {
        let dt = parse_graph_datetime("2024-01-15T17:30:00.1234567").unwrap();
        assert_eq!(
            dt.with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            "2024-01-15T17:30:00.123456"
        );
    }

    #[test]
    fn test_parse_graph_datetime_plain_and_zulu() {
        let plain = parse_graph_datetime("2024-01-15T09:00:00").unwrap();
        let zulu = parse_graph_datetime("2024-01-15T09:00:00Z").unwrap();
        assert_eq!(plain, zulu);
    }

    #[test]
    fn test_parse_graph_datetime_rejects_garbage() {
        assert!(parse_graph_datetime("January 15").is_err());
    }

    #[test]
    fn test_event_from_wire_defaults_and_caps() {
        let wire: WireEvent = serde_json::from_str(
            r#"{
                "start": {"dateTime": "2024-01-15T17:00:00.0000000", "timeZone": "UTC"},
                "end": {"dateTime": "2024-01-15T18:00:00.0000000", "timeZone": "UTC"},
                "attendees": [
                    {"emailAddress": {"name": "Maria Lopez", "address": "maria@arec.com"}},
                    {"emailAddress": {"address": "noname@arec.com"}},
                    {}
                ],
                "bodyPreview": "Agenda: pipeline review"
            }"#,
        )
        .unwrap();

        let event = event_from_wire(wire).unwrap();
        assert_eq!(event.title, "Untitled");
        assert_eq!(event.attendees, vec!["Maria Lopez", "noname@arec.com"]);
        assert_eq!(event.preview, "Agenda: pipeline review");
        assert!(!event.is_all_day);
        assert!(!event.is_past);
        assert_eq!(event.location, "");
    }

    #[test]
    fn test_event_from_wire_caps_attendees_and_preview() {
        let attendees: Vec<String> = (0..12)
            .map(|i| format!(r#"{{"emailAddress": {{"name": "Person {}"}}}}"#, i))
            .collect();
        let raw = format!(
            r#"{{
                "subject": "Big Sync",
                "start": {{"dateTime": "2024-01-15T17:00:00"}},
                "end": {{"dateTime": "2024-01-15T18:00:00"}},
                "attendees": [{}],
                "bodyPreview": "{}"
            }}"#,
            attendees.join(","),
            "p".repeat(400)
        );
        let event = event_from_wire(serde_json::from_str(&raw).unwrap()).unwrap();
        assert_eq!(event.attendees.len(), 8);
        assert_eq!(event.preview.len(), 200);
    }

    #[test]
    fn test_email_from_wire_defaults() {
        let wire: WireMessage = serde_json::from_str(
            r#"{"receivedDateTime": "2024-01-15T12:00:00.0000000"}"#,
        )
        .unwrap();
        let email = email_from_wire(wire).unwrap();
        assert_eq!(email.subject, "(no subject)");
        assert_eq!(email.from_name, "Unknown");
        assert_eq!(email.from_email, "");
        assert!(email.is_read);
        assert!(!email.has_attachments);
    }

    #[test]
    fn test_email_from_wire_full_fields() {
        let wire: WireMessage = serde_json::from_str(
            r#"{
                "subject": "Wire details",
                "from": {"emailAddress": {"name": "Bob Chen", "address": "bob@meridian.com"}},
                "receivedDateTime": "2024-01-15T12:00:00Z",
                "bodyPreview": "Attached are the wire instructions",
                "hasAttachments": true,
                "isRead": false
            }"#,
        )
        .unwrap();
        let email = email_from_wire(wire).unwrap();
        assert_eq!(email.from_name, "Bob Chen");
        assert_eq!(email.from_email, "bob@meridian.com");
        assert!(email.has_attachments);
        assert!(!email.is_read);
    }

    #[test]
    fn test_graph_list_tolerates_missing_value() {
        let list: GraphList<WireMessage> = serde_json::from_str("{}").unwrap();
        assert!(list.value.is_empty());
    }
}

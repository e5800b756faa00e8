//! Microsoft Graph integration
//!
//! Auth is the OAuth2 device flow with a JSON token cache on disk; the
//! client wraps the two read-only queries the briefing needs, calendarView
//! and inbox messages.

pub mod auth;
pub mod client;

pub use auth::GraphAuth;
pub use client::{CalendarEvent, EmailMessage, GraphClient};

pub(crate) const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

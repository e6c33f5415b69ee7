//! Raw order records as written by the KKTIX order dump
//!
//! The dump is a JSON array of objects like:
//!
//! ```json
//! {
//!   "order_number": "12345678",
//!   "thumbnail_url": "https://.../thumb.jpg",
//!   "event_title": "Rust Meetup #42",
//!   "event_url": "https://rust.kktix.cc/events/42",
//!   "details": {
//!     "Start Time": "2024/01/10 19:00(Wed)",
//!     "Event Time": "2024/01/10 19:00(Wed) ~ 21:00",
//!     "Event Location": "Taipei",
//!     "Event Host": "Rust Taiwan",
//!     "Ticket Types": "General",
//!     "Tickets": "1",
//!     "Amount": "NT$500",
//!     "Receipt": { "number": "AB-12345678", "url": "https://..." }
//!   },
//!   "actions": [{ "text": "View Ticket", "url": "https://...", "disabled": false }]
//! }
//! ```
//!
//! Records are immutable after load. Everything derived from them lives in
//! [`crate::normalize::NormalizedEvent`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Location value the order page uses when it has nothing better
pub const UNKNOWN_LOCATION: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "event_title")]
    pub title: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub event_url: Option<String>,
    #[serde(default)]
    pub details: EventDetails,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(rename = "Start Time", default, deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(rename = "End Time", default, deserialize_with = "lenient_string")]
    pub end_time: Option<String>,
    /// Full `start ~ end` range as shown on the registration page
    #[serde(rename = "Event Time", default, deserialize_with = "lenient_string")]
    pub event_time: Option<String>,
    #[serde(rename = "Event Location", default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(rename = "Event Host", default, deserialize_with = "lenient_string")]
    pub host: Option<String>,
    #[serde(rename = "Ticket Types", default, deserialize_with = "lenient_string")]
    pub ticket_types: Option<String>,
    #[serde(rename = "Tickets", default, deserialize_with = "lenient_string")]
    pub tickets: Option<String>,
    #[serde(rename = "Amount", default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(rename = "Receipt", default)]
    pub receipt: Option<Receipt>,
    /// Keys we don't interpret (e.g. `State`), kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "text")]
    pub label: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl EventRecord {
    pub fn host(&self) -> &str {
        self.details.host.as_deref().unwrap_or("")
    }

    pub fn location(&self) -> &str {
        self.details.location.as_deref().unwrap_or("")
    }

    /// Location usable for aggregation: present, non-blank, not the sentinel
    pub fn known_location(&self) -> Option<&str> {
        let loc = self.location().trim();
        if loc.is_empty() || loc == UNKNOWN_LOCATION {
            None
        } else {
            Some(loc)
        }
    }
}

/// Accept strings, numbers and booleans; map null to `None`.
///
/// `Tickets` shows up as both `"2"` and `2` depending on the dump version.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

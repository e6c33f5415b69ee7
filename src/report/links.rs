//! Link targets for clickable page elements
//!
//! A static report has no server behind it, so a bar click jumps to a
//! pre-rendered detail panel (`#detail-7`) that CSS shows via `:target`.
//! In serve mode every interaction is a GET with the whole page state in the
//! query string, so a click re-renders with `event=7`.

use crate::filter::FilterParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Standalone file, no server
    Static,
    /// Rendered per request by [`crate::serve`]
    Served,
}

/// Page state carried in the query string.
///
/// `width` and `event` are kept as strings so a mangled value degrades to
/// "absent" instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl PageQuery {
    pub fn parse(query: &str) -> Self {
        serde_urlencoded::from_str(query).unwrap_or_default()
    }

    pub fn filter(&self) -> FilterParams {
        FilterParams {
            host: self.host.clone(),
            year: self.year.clone(),
            location: self.location.clone(),
            search: self.q.clone(),
        }
    }

    pub fn width(&self) -> Option<u32> {
        self.width.as_deref().and_then(|w| w.trim().parse().ok())
    }

    pub fn event(&self) -> Option<usize> {
        self.event.as_deref().and_then(|e| e.trim().parse().ok())
    }

    fn from_state(filter: &FilterParams, width: u32, event: Option<usize>) -> Self {
        // Drop "all" so links stay short
        let active = |v: &String| if v == crate::filter::ALL { String::new() } else { v.clone() };
        Self {
            host: active(&filter.host),
            year: active(&filter.year),
            location: active(&filter.location),
            q: filter.search.clone(),
            width: Some(width.to_string()),
            event: event.map(|e| e.to_string()),
        }
    }

    fn to_href(&self) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(q) if !q.is_empty() => format!("/?{}", q),
            _ => "/".to_string(),
        }
    }
}

/// Builds hrefs for the current page state
#[derive(Debug, Clone, Copy)]
pub struct Links<'a> {
    pub mode: PageMode,
    pub filter: &'a FilterParams,
    pub width: u32,
}

impl<'a> Links<'a> {
    pub fn new(mode: PageMode, filter: &'a FilterParams, width: u32) -> Self {
        Self { mode, filter, width }
    }

    /// Open the detail panel for event `id`
    pub fn detail(&self, id: usize) -> String {
        match self.mode {
            PageMode::Static => format!("#{}", detail_anchor(id)),
            PageMode::Served => PageQuery::from_state(self.filter, self.width, Some(id)).to_href(),
        }
    }

    /// Close the detail panel, keeping filters
    pub fn close(&self) -> String {
        match self.mode {
            PageMode::Static => "#".to_string(),
            PageMode::Served => PageQuery::from_state(self.filter, self.width, None).to_href(),
        }
    }

    /// Clear all filters, keeping the viewport width
    pub fn reset(&self) -> String {
        match self.mode {
            PageMode::Static => "#".to_string(),
            PageMode::Served => format!("/reset?width={}", self.width),
        }
    }
}

pub fn detail_anchor(id: usize) -> String {
    format!("detail-{}", id)
}

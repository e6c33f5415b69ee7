//! Filter engine
//!
//! A filtered view is the subset of the full collection that satisfies every
//! active predicate, sorted most recent first. Selector options are always
//! derived from the full collection so applying one filter never removes a
//! choice from another selector.

use crate::normalize::NormalizedEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selector value meaning "no constraint"
pub const ALL: &str = "all";

/// Current filter selections.
///
/// Empty strings and `"all"` are both inactive, so a form submitted with
/// blank fields behaves like a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "is_inactive")]
    pub host: String,
    #[serde(default, skip_serializing_if = "is_inactive")]
    pub year: String,
    #[serde(default, skip_serializing_if = "is_inactive")]
    pub location: String,
    /// Case-insensitive substring of the title
    #[serde(default, rename = "q", skip_serializing_if = "String::is_empty")]
    pub search: String,
}

fn is_inactive(value: &String) -> bool {
    value.is_empty() || value == ALL
}

impl FilterParams {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn is_active(&self) -> bool {
        !is_inactive(&self.host)
            || !is_inactive(&self.year)
            || !is_inactive(&self.location)
            || !self.search.is_empty()
    }

    /// True when every active predicate holds for `event`.
    pub fn matches(&self, event: &NormalizedEvent) -> bool {
        let host_ok = is_inactive(&self.host) || event.record.host() == self.host;
        let year_ok = is_inactive(&self.year) || event.year.to_string() == self.year;
        let location_ok = is_inactive(&self.location) || event.record.location() == self.location;
        let search_ok = self.search.is_empty()
            || event
                .record
                .title
                .to_lowercase()
                .contains(&self.search.to_lowercase());

        host_ok && year_ok && location_ok && search_ok
    }
}

/// Apply `params` to the full collection and sort the result for display.
pub fn apply<'a>(events: &'a [NormalizedEvent], params: &FilterParams) -> Vec<&'a NormalizedEvent> {
    apply_positions(events, params).into_iter().map(|i| &events[i]).collect()
}

/// Same as [`apply`], but yields positions into `events`. Most recent first;
/// the sort is stable, so equal starts keep collection order.
pub fn apply_positions(events: &[NormalizedEvent], params: &FilterParams) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..events.len()).filter(|&i| params.matches(&events[i])).collect();
    positions.sort_by(|&a, &b| events[b].start.cmp(&events[a].start));
    positions
}

/// Distinct selector values from the full collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Ascending
    pub hosts: Vec<String>,
    /// Most recent first
    pub years: Vec<i32>,
    /// Ascending
    pub locations: Vec<String>,
}

impl FilterOptions {
    pub fn from_events(events: &[NormalizedEvent]) -> Self {
        let mut hosts = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut locations = BTreeSet::new();

        for event in events {
            let host = event.record.host();
            if !host.is_empty() {
                hosts.insert(host.to_string());
            }
            years.insert(event.year);
            let location = event.record.location();
            if !location.is_empty() {
                locations.insert(location.to_string());
            }
        }

        Self {
            hosts: hosts.into_iter().collect(),
            years: years.into_iter().rev().collect(),
            locations: locations.into_iter().collect(),
        }
    }

    pub fn host_index(&self, host: &str) -> Option<usize> {
        self.hosts.binary_search_by(|h| h.as_str().cmp(host)).ok()
    }
}

//! Application state
//!
//! [`AppState`] owns the full collection and the one piece of mutable state
//! the page has: the current filter, the filtered view it produced, the
//! selected event, and the viewport width. Every interaction goes through a
//! method here, and the renderer only ever reads it.

use crate::event::EventRecord;
use crate::filter::{self, FilterOptions, FilterParams};
use crate::loader::Dump;
use crate::normalize::{self, Normalized, NormalizedEvent, Rejected};
use tracing::debug;

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1200;

#[derive(Debug, Clone)]
pub struct AppState {
    events: Vec<NormalizedEvent>,
    rejected: Vec<Rejected>,
    options: FilterOptions,
    filter: FilterParams,
    /// Positions into `events`, in display order
    view: Vec<usize>,
    selected: Option<usize>,
    viewport_width: u32,
}

impl AppState {
    /// Normalize `records` and start with every event visible. Each record's
    /// position in `records` is its id.
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self::from_normalized(normalize::normalize(records))
    }

    /// Build from a loaded dump. Ids and rejected indexes are both positions
    /// in the dump array, and rejections are listed in dump order whichever
    /// stage dropped them.
    pub fn from_dump(dump: Dump) -> Self {
        let mut normalized = normalize::normalize_indexed(dump.records);
        normalized.rejected.extend(dump.rejected);
        normalized.rejected.sort_by_key(|r| r.index);
        Self::from_normalized(normalized)
    }

    fn from_normalized(normalized: Normalized) -> Self {
        let options = FilterOptions::from_events(&normalized.events);

        let mut state = Self {
            events: normalized.events,
            rejected: normalized.rejected,
            options,
            filter: FilterParams::default(),
            view: Vec::new(),
            selected: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
        };
        state.refilter();
        state
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn filter(&self) -> &FilterParams {
        &self.filter
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// The current filtered view, most recent first
    pub fn filtered(&self) -> Vec<&NormalizedEvent> {
        self.view.iter().map(|&i| &self.events[i]).collect()
    }

    pub fn selected(&self) -> Option<&NormalizedEvent> {
        self.selected.map(|i| &self.events[i])
    }

    /// Replace the filter and recompute the view from the full collection.
    pub fn apply_filter(&mut self, params: FilterParams) {
        self.filter = params;
        self.refilter();
    }

    /// Clear every selector and the search text.
    pub fn reset(&mut self) {
        self.apply_filter(FilterParams::default());
    }

    /// Record a new viewport width. The view itself is untouched, so the next
    /// render redraws the last filtered data at the new size.
    pub fn resize(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Open the detail panel for the event with this `id`. Returns false
    /// (and leaves the selection alone) unless the event is in the current
    /// filtered view.
    pub fn select(&mut self, id: usize) -> bool {
        match self.view.iter().copied().find(|&pos| self.events[pos].id == id) {
            Some(pos) => {
                self.selected = Some(pos);
                true
            }
            None => false,
        }
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    fn refilter(&mut self) {
        self.view = filter::apply_positions(&self.events, &self.filter);
        // A panel for an event the filter now hides would be stale
        if let Some(pos) = self.selected {
            if !self.view.contains(&pos) {
                self.selected = None;
            }
        }
        debug!(
            visible = self.view.len(),
            total = self.events.len(),
            filter = ?self.filter,
            "applied filter"
        );
    }
}

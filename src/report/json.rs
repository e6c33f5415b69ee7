//! JSON export of the filtered view

use super::Summary;
use crate::filter::FilterParams;
use crate::normalize::{NormalizedEvent, Rejected};
use crate::state::AppState;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub generated: String,
    pub filter: &'a FilterParams,
    pub summary: Summary,
    pub events: Vec<JsonEvent<'a>>,
    pub rejected: &'a [Rejected],
}

#[derive(Serialize)]
pub struct JsonEvent<'a> {
    pub id: usize,
    pub title: &'a str,
    pub order_number: &'a str,
    pub host: &'a str,
    pub location: &'a str,
    pub start: String,
    pub end: Option<String>,
    pub year: i32,
    pub amount: i64,
    pub hours: f64,
}

impl<'a> From<&'a NormalizedEvent> for JsonEvent<'a> {
    fn from(e: &'a NormalizedEvent) -> Self {
        Self {
            id: e.id,
            title: &e.record.title,
            order_number: &e.record.order_number,
            host: e.record.host(),
            location: e.record.location(),
            start: e.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end: e.has_end.then(|| e.end.format("%Y-%m-%dT%H:%M:%S").to_string()),
            year: e.year,
            amount: e.amount,
            hours: e.hours,
        }
    }
}

pub fn build(state: &AppState) -> JsonReport<'_> {
    let view = state.filtered();
    JsonReport {
        generated: chrono::Local::now().to_rfc3339(),
        filter: state.filter(),
        summary: Summary::from_events(&view),
        events: view.into_iter().map(JsonEvent::from).collect(),
        rejected: state.rejected(),
    }
}

pub fn write<W: Write>(writer: &mut W, state: &AppState) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &build(state))?;
    writeln!(writer)
}

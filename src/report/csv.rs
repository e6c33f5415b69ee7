//! CSV export of the filtered view

use crate::state::AppState;
use std::io::{self, Write};

const HEADER: &[&str] = &[
    "order_number",
    "title",
    "organizer",
    "location",
    "start",
    "end",
    "year",
    "amount",
    "hours",
];

pub fn write<W: Write>(writer: &mut W, state: &AppState) -> io::Result<()> {
    writeln!(writer, "{}", HEADER.join(","))?;

    for e in state.filtered() {
        let end = if e.has_end {
            e.end.format("%Y-%m-%d %H:%M").to_string()
        } else {
            String::new()
        };
        let fields = [
            escape(&e.record.order_number),
            escape(&e.record.title),
            escape(e.record.host()),
            escape(e.record.location()),
            e.start.format("%Y-%m-%d %H:%M").to_string(),
            end,
            e.year.to_string(),
            e.amount.to_string(),
            format!("{:.1}", e.hours),
        ];
        writeln!(writer, "{}", fields.join(","))?;
    }

    Ok(())
}

/// Quote a field if it contains a separator, quote or line break
fn escape(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

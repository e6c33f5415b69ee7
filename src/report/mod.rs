//! Report generation for a ticket timeline
//!
//! This module renders the current filtered view in several formats:
//!
//! - **HTML**: the timeline page (SVG timeline, summary charts, detail panel)
//! - **JSON**: normalized events plus summary, for programmatic consumption
//! - **CSV**: one row per event, for spreadsheets
//!
//! # Usage
//!
//! ```ignore
//! use ticketline::{report, AppState};
//!
//! // Automatically picks format based on extension
//! report::generate("timeline.html", &state, &layout)?;  // HTML
//! report::generate("timeline.json", &state, &layout)?;  // JSON
//! report::generate("timeline.csv", &state, &layout)?;   // CSV
//! ```

pub mod charts;
pub mod csv;
pub mod detail;
pub mod html;
pub mod json;
pub mod links;
pub mod scale;
pub mod timeline;

use crate::error::{Error, Result};
use crate::normalize::NormalizedEvent;
use crate::state::AppState;
use serde::Serialize;
use std::path::Path;

pub use links::{Links, PageMode};
pub use timeline::TimelineLayout;

/// Prefix for every displayed amount
pub const CURRENCY: &str = "NT$";

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, state: &AppState, layout: &TimelineLayout) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;

    match ext.as_str() {
        "json" => json::write(&mut file, state)?,
        "csv" => csv::write(&mut file, state)?,
        _ => html::write(&mut file, state, PageMode::Static, layout)?,
    }
    Ok(())
}

/// Aggregate totals over a filtered view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_amount: i64,
    pub count: usize,
    pub total_hours: f64,
}

impl Summary {
    pub fn from_events(events: &[&NormalizedEvent]) -> Self {
        let mut summary = Self::default();
        summary.count = events.len();

        for event in events {
            // Saturate: one absurd amount must not take the page down
            summary.total_amount = summary.total_amount.saturating_add(event.amount);
            summary.total_hours += event.hours;
        }

        summary
    }

    pub fn amount_label(&self) -> String {
        format_currency(self.total_amount)
    }

    pub fn hours_label(&self) -> String {
        format!("{:.1}", self.total_hours)
    }
}

/// `1234567` → `"NT$ 1,234,567"`
pub fn format_currency(amount: i64) -> String {
    format!("{} {}", CURRENCY, group_thousands(amount))
}

/// Insert `,` every three digits.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Escape text for HTML/SVG content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut `s` to `keep` characters plus `...` when it is longer than `max`.
///
/// Counts characters, not bytes: most titles are CJK.
pub fn truncate(s: &str, max: usize, keep: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(keep).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDetails, EventRecord};
    use crate::normalize::normalize_one;

    // ==========================================================================
    // SUMMARY STATISTICS TESTS
    // ==========================================================================
    //
    // The summary row shows total spend, event count and hours for whatever
    // the filters currently let through.
    // ==========================================================================

    fn create_test_event(id: usize, amount: &str, event_time: Option<&str>) -> NormalizedEvent {
        let record = EventRecord {
            title: format!("Event {}", id),
            order_number: id.to_string(),
            thumbnail_url: None,
            event_url: None,
            details: EventDetails {
                start_time: Some("2024/01/10 19:00".to_string()),
                event_time: event_time.map(String::from),
                amount: Some(amount.to_string()),
                ..Default::default()
            },
            actions: vec![],
        };
        normalize_one(id, record).unwrap()
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_events(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.amount_label(), "NT$ 0");
        assert_eq!(summary.hours_label(), "0.0");
    }

    #[test]
    fn test_summary_sums_parsed_amounts() {
        let events = vec![
            create_test_event(0, "NT$ 1,200", None),
            create_test_event(1, "NT$500", None),
            create_test_event(2, "Free", None),
            create_test_event(3, "", None),
        ];
        let refs: Vec<&NormalizedEvent> = events.iter().collect();
        let summary = Summary::from_events(&refs);

        assert_eq!(summary.count, 4);
        assert_eq!(summary.total_amount, 1700);
        assert_eq!(summary.amount_label(), "NT$ 1,700");
    }

    #[test]
    fn test_summary_total_saturates_on_huge_amounts() {
        let events = vec![
            create_test_event(0, "NT$9,000,000,000,000,000,000", None),
            create_test_event(1, "NT$9,000,000,000,000,000,000", None),
        ];
        let refs: Vec<&NormalizedEvent> = events.iter().collect();
        let summary = Summary::from_events(&refs);

        assert_eq!(summary.total_amount, i64::MAX, "sum clamps instead of overflowing");
        assert!(summary.amount_label().starts_with("NT$ 9,223,372,036,854,775,807"));
    }

    #[test]
    fn test_summary_hours_skip_malformed() {
        let events = vec![
            create_test_event(0, "0", Some("2024/01/10 19:00 ~ 21:30")),
            create_test_event(1, "0", Some("broken ~ range")),
            create_test_event(2, "0", Some("2024/01/10 19:00 ~ 20:00")),
        ];
        let refs: Vec<&NormalizedEvent> = events.iter().collect();
        let summary = Summary::from_events(&refs);

        assert!((summary.total_hours - 3.5).abs() < 1e-9);
        assert_eq!(summary.hours_label(), "3.5");
    }

    // ==========================================================================
    // FORMATTING HELPERS
    // ==========================================================================

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-12345), "-12,345");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & \"b\""), "a &amp; &quot;b&quot;");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 30, 27), "short");
        let long = "a".repeat(31);
        assert_eq!(truncate(&long, 30, 27), format!("{}...", "a".repeat(27)));

        // 31 CJK characters would panic with byte slicing
        let cjk = "音".repeat(31);
        assert_eq!(truncate(&cjk, 30, 27), format!("{}...", "音".repeat(27)));
    }

    // ==========================================================================
    // GENERATE TESTS
    // ==========================================================================

    #[test]
    fn test_generate_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("timeline.html");
        let state = AppState::new(vec![]);

        let err = generate(&path, &state, &TimelineLayout::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("timeline.html"), "error names the path");
    }

    #[test]
    fn test_generate_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(vec![]);
        let layout = TimelineLayout::default();

        let csv_path = dir.path().join("out.CSV");
        generate(&csv_path, &state, &layout).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().starts_with("order_number,"));

        let html_path = dir.path().join("out.htm");
        generate(&html_path, &state, &layout).unwrap();
        assert!(std::fs::read_to_string(&html_path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}

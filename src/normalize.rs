//! Record normalization
//!
//! Turns raw [`EventRecord`]s into [`NormalizedEvent`]s carrying parsed
//! timestamps, amount, year and duration. The raw strings are scraped from an
//! order page, so every parser here is defensive:
//!
//! - Timestamps use `/` as the date separator and may carry a weekday suffix
//!   in parentheses: `2024/01/10 19:00(Wed)`.
//! - Ranges are written `start ~ end`, where `end` may be a bare time of day
//!   (`2024/01/10 19:00 ~ 21:00`).
//! - Amounts look like `NT$1,200` or `Free`.
//!
//! Nothing in this module panics or returns an error on bad input. A record
//! whose start time cannot be parsed is excluded and reported as
//! [`Rejected`]; every other problem falls back to a neutral value.

use crate::event::EventRecord;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, warn};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// An event with its derived fields attached
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    /// Position in the full loaded collection; stable across filters
    pub id: usize,
    pub record: EventRecord,
    pub start: NaiveDateTime,
    /// Equals `start` when the record has no usable end time
    pub end: NaiveDateTime,
    /// True when `end` came from the record rather than the fallback
    pub has_end: bool,
    pub year: i32,
    pub amount: i64,
    pub hours: f64,
}

/// A record that could not be placed on the timeline
#[derive(Debug, Clone, Serialize)]
pub struct Rejected {
    pub index: usize,
    pub title: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub events: Vec<NormalizedEvent>,
    pub rejected: Vec<Rejected>,
}

/// Normalize a collection, using each record's position as its id.
pub fn normalize(records: Vec<EventRecord>) -> Normalized {
    normalize_indexed(records.into_iter().enumerate())
}

/// Normalize records that already carry their position in the source dump.
///
/// That position becomes the event `id` or the `Rejected::index`, so both
/// point at the same dump entry and ids stay stable even though rejected
/// records leave gaps.
pub fn normalize_indexed<I>(records: I) -> Normalized
where
    I: IntoIterator<Item = (usize, EventRecord)>,
{
    let mut out = Normalized::default();

    for (index, record) in records {
        match normalize_one(index, record) {
            Ok(event) => out.events.push(event),
            Err(rejected) => {
                warn!(
                    index = rejected.index,
                    title = rejected.title.as_deref().unwrap_or(""),
                    "skipping record: {}",
                    rejected.reason
                );
                out.rejected.push(rejected);
            }
        }
    }

    debug!(
        events = out.events.len(),
        rejected = out.rejected.len(),
        "normalized collection"
    );
    out
}

pub fn normalize_one(id: usize, record: EventRecord) -> Result<NormalizedEvent, Rejected> {
    let raw_start = match record.details.start_time.as_deref() {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(Rejected {
                index: id,
                title: Some(record.title.clone()),
                reason: "missing start time".to_string(),
            })
        }
    };

    let (start_part, range_end) = split_range(raw_start);
    let start = match parse_timestamp(start_part) {
        Some(ts) => ts,
        None => {
            return Err(Rejected {
                index: id,
                title: Some(record.title.clone()),
                reason: format!("unparseable start time {:?}", raw_start),
            })
        }
    };

    let end = record
        .details
        .end_time
        .as_deref()
        .and_then(|s| parse_end(start, s))
        .or_else(|| range_end.and_then(|s| parse_end(start, s)))
        .or_else(|| {
            record
                .details
                .event_time
                .as_deref()
                .and_then(|s| split_range(s).1)
                .and_then(|s| parse_end(start, s))
        });

    let hours = match record.details.event_time.as_deref() {
        Some(range) if range.contains('~') => parse_duration_hours(range),
        _ if raw_start.contains('~') => parse_duration_hours(raw_start),
        _ => end.map(|e| span_hours(start, e)).unwrap_or(0.0),
    };

    let amount = record.details.amount.as_deref().map(parse_amount).unwrap_or(0);

    Ok(NormalizedEvent {
        id,
        year: start.year(),
        start,
        end: end.unwrap_or(start),
        has_end: end.is_some(),
        amount,
        hours,
        record,
    })
}

/// Remove every parenthesized segment (ASCII or full-width) and collapse
/// whitespace.
pub fn strip_parenthetical(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' | '（' => depth += 1,
            ')' | '）' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `start ~ end` into its sides. The end side is `None` when there is
/// no `~` or nothing after it.
pub fn split_range(s: &str) -> (&str, Option<&str>) {
    match s.split_once('~') {
        Some((left, right)) => {
            let right = right.trim();
            (left.trim(), if right.is_empty() { None } else { Some(right) })
        }
        None => (s.trim(), None),
    }
}

/// Parse a scraped timestamp. Date-only input lands at midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let cleaned = strip_parenthetical(s).replace('/', "-");
    if cleaned.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let cleaned = strip_parenthetical(s);
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&cleaned, fmt).ok())
}

/// Parse an end candidate relative to `start`: either a full timestamp or a
/// bare time of day on the start's date.
fn parse_end(start: NaiveDateTime, s: &str) -> Option<NaiveDateTime> {
    parse_timestamp(s).or_else(|| parse_time_of_day(s).map(|t| start.date().and_time(t)))
}

/// Parse an amount by keeping only digits and `-`, then reading the leading
/// signed integer of what is left.
///
/// `"NT$ 1,200"` → 1200, `"NT$1,000-NT$2,000"` → 1000, `"Free"` → 0.
/// Amounts outside the `i64` range count as 0.
pub fn parse_amount(s: &str) -> i64 {
    let kept: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
    let unsigned = kept.strip_prefix('-').unwrap_or(&kept);
    let digits_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return 0;
    }
    let sign_len = kept.len() - unsigned.len();
    let number = &kept[..sign_len + digits_len];

    match number.parse() {
        Ok(amount) => amount,
        Err(e) => {
            warn!(amount = s, "amount out of range, counting as 0: {}", e);
            0
        }
    }
}

/// Hours covered by a `start ~ end` range string.
///
/// Malformed or single-sided input yields 0. A negative span (end before
/// start) also yields 0 so that one bad record can't shrink a total.
pub fn parse_duration_hours(s: &str) -> f64 {
    let (left, right) = split_range(s);
    let Some(right) = right else {
        return 0.0;
    };
    let Some(start) = parse_timestamp(left) else {
        return 0.0;
    };
    match parse_end(start, right) {
        Some(end) => span_hours(start, end),
        None => 0.0,
    }
}

fn span_hours(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let secs = (end - start).num_seconds();
    if secs <= 0 {
        0.0
    } else {
        secs as f64 / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDetails;

    fn record(start: Option<&str>) -> EventRecord {
        EventRecord {
            title: "Test Event".to_string(),
            order_number: "1".to_string(),
            thumbnail_url: None,
            event_url: None,
            details: EventDetails {
                start_time: start.map(String::from),
                ..Default::default()
            },
            actions: vec![],
        }
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    // ==========================================================================
    // TIMESTAMP PARSING TESTS
    // ==========================================================================

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_timestamp("2024/01/10"), Some(ts("2024-01-10 00:00")));
    }

    #[test]
    fn test_parse_date_and_time() {
        assert_eq!(parse_timestamp("2024/01/10 19:30"), Some(ts("2024-01-10 19:30")));
    }

    #[test]
    fn test_parse_strips_weekday_suffix() {
        assert_eq!(parse_timestamp("2024/01/10 19:30(Wed)"), Some(ts("2024-01-10 19:30")));
        assert_eq!(parse_timestamp("2024/01/10(三) 19:30"), Some(ts("2024-01-10 19:30")));
        assert_eq!(parse_timestamp("2024/01/10（三）"), Some(ts("2024-01-10 00:00")));
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("TBA"), None);
        assert_eq!(parse_timestamp("(Wed)"), None);
        assert_eq!(parse_timestamp("2024/13/40"), None);
    }

    #[test]
    fn test_strip_parenthetical_unbalanced() {
        // Stray closing paren must not underflow
        assert_eq!(strip_parenthetical("a) b (c"), "a b");
    }

    // ==========================================================================
    // AMOUNT PARSING TESTS
    // ==========================================================================

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("NT$ 1,200"), 1200);
        assert_eq!(parse_amount("NT$500"), 500);
        assert_eq!(parse_amount("-300"), -300);
        assert_eq!(parse_amount(""), 0);
        assert_eq!(parse_amount("free"), 0);
        assert_eq!(parse_amount("Free"), 0);
        assert_eq!(parse_amount("-"), 0, "a lone minus sign is not a number");
    }

    #[test]
    fn test_parse_amount_reads_leading_integer() {
        assert_eq!(parse_amount("NT$1,000-NT$2,000"), 1000, "range keeps its lower bound");
        assert_eq!(parse_amount("-NT$300 refund"), -300);
        assert_eq!(parse_amount("--5"), 0);
        assert_eq!(parse_amount("Free (was NT$800)"), 800);
    }

    #[test]
    fn test_parse_amount_out_of_range() {
        assert_eq!(parse_amount("NT$99,999,999,999,999,999,999"), 0);
        assert_eq!(parse_amount("NT$9,000,000,000,000,000,000"), 9_000_000_000_000_000_000);
    }

    // ==========================================================================
    // DURATION TESTS
    // ==========================================================================

    #[test]
    fn test_duration_full_range() {
        let hours = parse_duration_hours("2024/01/10 19:00(Wed) ~ 2024/01/10 21:30(Wed)");
        assert!((hours - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_duration_time_only_end() {
        let hours = parse_duration_hours("2024/01/10 19:00 ~ 22:00");
        assert!((hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_malformed_contributes_zero() {
        assert_eq!(parse_duration_hours("2024/01/10 19:00"), 0.0, "single-sided");
        assert_eq!(parse_duration_hours("2024/01/10 19:00 ~"), 0.0, "empty end");
        assert_eq!(parse_duration_hours("soon ~ later"), 0.0);
        assert_eq!(parse_duration_hours("2024/01/10 ~ 2024/01/09"), 0.0, "reversed");
    }

    // ==========================================================================
    // RECORD NORMALIZATION TESTS
    // ==========================================================================

    #[test]
    fn test_end_defaults_to_start() {
        let event = normalize_one(0, record(Some("2024/02/01"))).unwrap();
        assert_eq!(event.end, event.start);
        assert!(!event.has_end);
        assert_eq!(event.year, 2024);
        assert_eq!(event.hours, 0.0);
    }

    #[test]
    fn test_end_from_end_time_field() {
        let mut r = record(Some("2024/01/10"));
        r.details.end_time = Some("2024/01/12".to_string());
        let event = normalize_one(0, r).unwrap();
        assert_eq!(event.end, ts("2024-01-12 00:00"));
        assert!(event.has_end);
        assert!((event.hours - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_from_event_time_range() {
        let mut r = record(Some("2024/01/10 19:00(Wed)"));
        r.details.event_time = Some("2024/01/10 19:00(Wed) ~ 21:00".to_string());
        let event = normalize_one(0, r).unwrap();
        assert_eq!(event.end, ts("2024-01-10 21:00"));
        assert!((event.hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_time_as_range() {
        let event = normalize_one(0, record(Some("2024/03/01 10:00 ~ 2024/03/02 10:00"))).unwrap();
        assert_eq!(event.start, ts("2024-03-01 10:00"));
        assert_eq!(event.end, ts("2024-03-02 10:00"));
        assert!((event.hours - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_end_falls_back() {
        let mut r = record(Some("2024/01/10"));
        r.details.end_time = Some("whenever".to_string());
        let event = normalize_one(0, r).unwrap();
        assert_eq!(event.end, event.start);
        assert!(!event.has_end);
    }

    #[test]
    fn test_reversed_span_is_kept() {
        // end < start is tolerated; the renderer clamps the width
        let mut r = record(Some("2024/01/10"));
        r.details.end_time = Some("2024/01/05".to_string());
        let event = normalize_one(0, r).unwrap();
        assert!(event.end < event.start);
        assert_eq!(event.hours, 0.0);
    }

    #[test]
    fn test_missing_or_bad_start_is_rejected() {
        let err = normalize_one(3, record(None)).unwrap_err();
        assert_eq!(err.index, 3);
        assert!(err.reason.contains("missing"));

        let err = normalize_one(4, record(Some("TBA"))).unwrap_err();
        assert!(err.reason.contains("unparseable"));
    }

    #[test]
    fn test_normalize_keeps_ids_stable() {
        let out = normalize(vec![
            record(Some("2024/01/01")),
            record(Some("nope")),
            record(Some("2024/01/03")),
        ]);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.events[0].id, 0);
        assert_eq!(out.events[1].id, 2, "ids are positions in the loaded collection");
    }

    #[test]
    fn test_normalize_does_not_touch_raw_strings() {
        let out = normalize(vec![record(Some("2024/01/10 19:30(Wed)"))]);
        assert_eq!(
            out.events[0].record.details.start_time.as_deref(),
            Some("2024/01/10 19:30(Wed)")
        );
    }
}

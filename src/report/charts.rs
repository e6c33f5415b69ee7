//! Summary bar charts
//!
//! Two small SVG charts drawn from the filtered view:
//!
//! - top 5 events by amount (positive amounts only)
//! - top 5 locations by event count (`Unknown` and blank excluded)

use super::scale::{BandScale, LinearScale};
use super::{escape, group_thousands, truncate, CURRENCY};
use crate::normalize::NormalizedEvent;
use indexmap::IndexMap;
use std::fmt::Write as _;

pub const TOP_N: usize = 5;

const BAR_COLOR: &str = "#4e79a7";
const Y_TICKS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub label_max_chars: usize,
    pub label_keep_chars: usize,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 420.0,
            height: 260.0,
            margin_top: 24.0,
            margin_right: 16.0,
            margin_bottom: 70.0,
            margin_left: 80.0,
            label_max_chars: 10,
            label_keep_chars: 8,
        }
    }
}

impl ChartLayout {
    fn plot_width(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height - self.margin_top - self.margin_bottom).max(1.0)
    }
}

/// Highest amounts first. Non-positive amounts never appear; equal amounts
/// keep their order in `view`.
pub fn top_by_amount<'a>(view: &[&'a NormalizedEvent], n: usize) -> Vec<&'a NormalizedEvent> {
    let mut paid: Vec<&NormalizedEvent> = view.iter().copied().filter(|e| e.amount > 0).collect();
    paid.sort_by(|a, b| b.amount.cmp(&a.amount));
    paid.truncate(n);
    paid
}

/// Most frequent known locations. Ties keep first-seen order.
pub fn top_locations(view: &[&NormalizedEvent], n: usize) -> Vec<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for event in view {
        if let Some(location) = event.record.known_location() {
            *counts.entry(location).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(loc, count)| (loc.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

struct Bar {
    label: String,
    full_label: String,
    value: f64,
    value_label: Option<String>,
}

pub fn render_amount_chart(view: &[&NormalizedEvent], layout: &ChartLayout) -> String {
    let bars: Vec<Bar> = top_by_amount(view, TOP_N)
        .into_iter()
        .map(|e| Bar {
            label: truncate(&e.record.title, layout.label_max_chars, layout.label_keep_chars),
            full_label: format!("{}: {} {}", e.record.title, CURRENCY, group_thousands(e.amount)),
            value: e.amount as f64,
            value_label: None,
        })
        .collect();

    render_bars(
        "amount-chart",
        "No paid events",
        &bars,
        layout,
        false,
        |v| format!("{}{}", CURRENCY, group_thousands(v as i64)),
    )
}

pub fn render_location_chart(view: &[&NormalizedEvent], layout: &ChartLayout) -> String {
    let bars: Vec<Bar> = top_locations(view, TOP_N)
        .into_iter()
        .map(|(location, count)| Bar {
            label: truncate(&location, layout.label_max_chars, layout.label_keep_chars),
            full_label: format!("{}: {}", location, count),
            value: count as f64,
            value_label: Some(count.to_string()),
        })
        .collect();

    render_bars(
        "location-chart",
        "No known locations",
        &bars,
        layout,
        true,
        |v| format!("{}", v as i64),
    )
}

fn render_bars(
    class: &str,
    empty_message: &str,
    bars: &[Bar],
    layout: &ChartLayout,
    integer_ticks: bool,
    tick_format: impl Fn(f64) -> String,
) -> String {
    if bars.is_empty() {
        return format!(r#"<p class="empty">{}</p>"#, escape(empty_message));
    }

    let width = layout.plot_width();
    let height = layout.plot_height();
    let max = bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let x = BandScale::new(bars.len(), width, 0.3);
    let y = LinearScale::new(max, height, Y_TICKS, integer_ticks);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart {class}" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        class = class,
        w = layout.width,
        h = layout.height
    );
    let _ = write!(
        svg,
        r#"<g transform="translate({},{})">"#,
        layout.margin_left, layout.margin_top
    );

    // Y axis with grid
    svg.push_str(r#"<g class="y-axis">"#);
    for tick in y.ticks() {
        let py = y.map(tick);
        let _ = write!(
            svg,
            r##"<g class="tick" transform="translate(0,{:.1})"><line x2="{:.1}" stroke="#eee"/><line x2="-6" stroke="#333"/><text x="-9" dy=".32em" text-anchor="end">{}</text></g>"##,
            py,
            width,
            escape(&tick_format(tick))
        );
    }
    svg.push_str("</g>");

    // Bars
    for (i, bar) in bars.iter().enumerate() {
        let bx = x.position(i);
        let by = y.map(bar.value);
        let bh = (height - by).max(0.0);
        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}</title></rect>"#,
            bx,
            by,
            x.bandwidth(),
            bh,
            BAR_COLOR,
            escape(&bar.full_label)
        );
        if let Some(value) = &bar.value_label {
            let _ = write!(
                svg,
                r#"<text class="value-label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                bx + x.bandwidth() / 2.0,
                by - 5.0,
                escape(value)
            );
        }
    }

    // X axis with rotated labels
    let _ = write!(svg, r#"<g class="x-axis" transform="translate(0,{:.1})">"#, height);
    let _ = write!(svg, r##"<line x2="{:.1}" stroke="#333"/>"##, width);
    for (i, bar) in bars.iter().enumerate() {
        let cx = x.position(i) + x.bandwidth() / 2.0;
        let _ = write!(
            svg,
            r#"<text transform="translate({:.1},12) rotate(-35)" text-anchor="end">{}<title>{}</title></text>"#,
            cx,
            escape(&bar.label),
            escape(&bar.full_label)
        );
    }
    svg.push_str("</g>");

    svg.push_str("</g></svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDetails, EventRecord};
    use crate::normalize::normalize_one;

    fn event(id: usize, title: &str, amount: &str, location: Option<&str>) -> NormalizedEvent {
        let record = EventRecord {
            title: title.to_string(),
            order_number: id.to_string(),
            thumbnail_url: None,
            event_url: None,
            details: EventDetails {
                start_time: Some("2024/01/10".to_string()),
                amount: Some(amount.to_string()),
                location: location.map(String::from),
                ..Default::default()
            },
            actions: vec![],
        };
        normalize_one(id, record).unwrap()
    }

    fn titles(events: &[&NormalizedEvent]) -> Vec<String> {
        events.iter().map(|e| e.record.title.clone()).collect()
    }

    // ==========================================================================
    // TOP-BY-AMOUNT TESTS
    // ==========================================================================

    #[test]
    fn test_top_by_amount_excludes_non_positive() {
        let events = vec![
            event(0, "Event A", "NT$500", None),
            event(1, "Event B", "NT$0", None),
            event(2, "Refund", "-200", None),
        ];
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        assert_eq!(titles(&top_by_amount(&view, TOP_N)), vec!["Event A"]);
    }

    #[test]
    fn test_top_by_amount_caps_at_five() {
        let events: Vec<NormalizedEvent> = (0..8)
            .map(|i| event(i, &format!("E{}", i), &format!("{}", (i + 1) * 100), None))
            .collect();
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        let top = top_by_amount(&view, TOP_N);
        assert_eq!(top.len(), 5);
        assert_eq!(titles(&top), vec!["E7", "E6", "E5", "E4", "E3"]);
    }

    #[test]
    fn test_top_by_amount_ties_keep_view_order() {
        let events = vec![
            event(0, "first", "300", None),
            event(1, "second", "300", None),
            event(2, "big", "900", None),
        ];
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        assert_eq!(titles(&top_by_amount(&view, TOP_N)), vec!["big", "first", "second"]);
    }

    // ==========================================================================
    // TOP-LOCATION TESTS
    // ==========================================================================

    #[test]
    fn test_top_locations_excludes_unknown_and_absent() {
        let events = vec![
            event(0, "a", "0", Some("Taipei")),
            event(1, "b", "0", Some("Unknown")),
            event(2, "c", "0", None),
            event(3, "d", "0", Some("Taipei")),
            event(4, "e", "0", Some("Kaohsiung")),
            event(5, "f", "0", Some("Unknown")),
        ];
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        let top = top_locations(&view, TOP_N);
        assert_eq!(
            top,
            vec![("Taipei".to_string(), 2), ("Kaohsiung".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_locations_caps_at_five() {
        let events: Vec<NormalizedEvent> = (0..7)
            .map(|i| event(i, "x", "0", Some(&format!("Venue {}", i))))
            .collect();
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        let top = top_locations(&view, TOP_N);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].0, "Venue 0", "ties keep first-seen order");
    }

    // ==========================================================================
    // SVG OUTPUT TESTS
    // ==========================================================================

    #[test]
    fn test_amount_chart_svg() {
        let events = vec![
            event(0, "Event A", "NT$500", None),
            event(1, "Event B", "NT$0", None),
        ];
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        let svg = render_amount_chart(&view, &ChartLayout::default());

        assert!(svg.contains("amount-chart"));
        assert_eq!(svg.matches("class=\"chart-bar\"").count(), 1);
        assert!(svg.contains("Event A: NT$ 500"));
        assert!(svg.contains(">NT$500<"), "y axis ticks are currency formatted");
    }

    #[test]
    fn test_location_chart_has_value_labels_and_integer_ticks() {
        let events = vec![
            event(0, "a", "0", Some("Taipei")),
            event(1, "b", "0", Some("Taipei")),
            event(2, "c", "0", Some("Tainan")),
        ];
        let view: Vec<&NormalizedEvent> = events.iter().collect();
        let svg = render_location_chart(&view, &ChartLayout::default());

        assert_eq!(svg.matches("class=\"value-label\"").count(), 2);
        assert!(svg.contains(">2</text>"));
        assert!(!svg.contains(">0.5<"), "count axis must not show fractional ticks");
    }

    #[test]
    fn test_empty_charts_render_placeholder() {
        let svg = render_amount_chart(&[], &ChartLayout::default());
        assert!(svg.contains("No paid events"));
        let svg = render_location_chart(&[], &ChartLayout::default());
        assert!(svg.contains("No known locations"));
    }
}

//! SVG timeline renderer
//!
//! One row per event in the order of the filtered view, a shared time axis
//! along the bottom, and per event:
//!
//! - a background stripe (alternating shade, highlighted on hover)
//! - a bar spanning `[start, end]`, never narrower than `min_bar_width`
//! - a title label in the left margin, truncated with the full title on hover
//! - a hidden info box (start, end, location) revealed while hovering the bar
//!
//! Bars and labels link to the event's detail panel. The SVG is rebuilt from
//! scratch on every call.

use super::links::Links;
use super::scale::{BandScale, TimeScale};
use super::{escape, truncate};
use crate::filter::FilterOptions;
use crate::normalize::NormalizedEvent;
use std::fmt::Write as _;

/// Qualitative palette for organizers (d3 category10)
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const FALLBACK_COLOR: &str = "#7f7f7f";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Timeline rendering configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    /// Cap on the total SVG width
    pub max_width: u32,
    /// Floor on the total SVG width so the plot area never collapses
    pub min_width: u32,
    /// Horizontal space the page keeps around the timeline
    pub page_gutter: u32,
    pub row_height: f64,
    /// Floor on plot height for small collections
    pub min_height: f64,
    /// Fraction of each row left empty around the bar
    pub row_padding: f64,
    pub margin: Margin,
    pub min_bar_width: f64,
    /// Titles longer than this are cut to `label_keep_chars` + `...`
    pub label_max_chars: usize,
    pub label_keep_chars: usize,
    /// Locations longer than this are cut in the info box
    pub location_max_chars: usize,
    pub tooltip_width: f64,
    pub tooltip_height: f64,
    /// Gap between the bar and its info box
    pub tooltip_offset: f64,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            max_width: 1200,
            min_width: 640,
            page_gutter: 40,
            row_height: 30.0,
            min_height: 100.0,
            row_padding: 0.3,
            margin: Margin {
                top: 30.0,
                right: 150.0,
                bottom: 50.0,
                left: 300.0,
            },
            min_bar_width: 8.0,
            label_max_chars: 30,
            label_keep_chars: 27,
            location_max_chars: 25,
            tooltip_width: 200.0,
            tooltip_height: 64.0,
            tooltip_offset: 15.0,
        }
    }
}

impl TimelineLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_width(mut self, width: u32) -> Self {
        self.max_width = width;
        self
    }

    pub fn row_height(mut self, height: f64) -> Self {
        self.row_height = height;
        self
    }

    pub fn min_bar_width(mut self, width: f64) -> Self {
        self.min_bar_width = width;
        self
    }

    /// Total SVG width for a viewport, capped at `max_width`
    pub fn canvas_width(&self, viewport: u32) -> u32 {
        let floor = self.min_width.min(self.max_width);
        viewport
            .saturating_sub(self.page_gutter)
            .clamp(floor, self.max_width)
    }

    /// Width of the plot area inside the margins
    pub fn plot_width(&self, viewport: u32) -> f64 {
        (self.canvas_width(viewport) as f64 - self.margin.left - self.margin.right).max(1.0)
    }

    /// Height of the plot area: one row per event, with a floor
    pub fn plot_height(&self, rows: usize) -> f64 {
        (rows as f64 * self.row_height).max(self.min_height)
    }

    /// Horizontal extent `(x, width)` of an event's bar
    pub fn bar_extent(&self, scale: &TimeScale, event: &NormalizedEvent) -> (f64, f64) {
        let x0 = scale.map(event.start);
        let x1 = scale.map(event.end);
        (x0, (x1 - x0).max(self.min_bar_width))
    }
}

/// Bar color for an organizer: its position in the full, sorted organizer
/// list picks the palette slot, so filtering never recolors a bar.
pub fn host_color(options: &FilterOptions, host: &str) -> &'static str {
    match options.host_index(host) {
        Some(i) => PALETTE[i % PALETTE.len()],
        None => FALLBACK_COLOR,
    }
}

/// Axis-aligned box in plot coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Top-left corner for an info box of `size` anchored at a bar.
///
/// Default placement is right of `anchor_right`, vertically centered on
/// `anchor_y`. If that overflows the right edge the box moves left of
/// `anchor_left`. If it overflows the top it is placed below the anchor, and
/// above if it overflows the bottom. A box that still doesn't fit is clamped.
pub fn place_tooltip(
    anchor_left: f64,
    anchor_right: f64,
    anchor_y: f64,
    size: (f64, f64),
    offset: f64,
    bounds: Bounds,
) -> (f64, f64) {
    let (w, h) = size;

    let mut x = anchor_right + offset;
    if x + w > bounds.right {
        x = anchor_left - offset - w;
    }
    x = x.max(bounds.left);

    let mut y = anchor_y - h / 2.0;
    if y < bounds.top {
        y = anchor_y;
    } else if y + h > bounds.bottom {
        y = anchor_y - h;
    }
    y = y.min(bounds.bottom - h).max(bounds.top);

    (x, y)
}

/// Render the timeline for `view`. Returns an HTML fragment.
pub fn render(
    view: &[&NormalizedEvent],
    options: &FilterOptions,
    layout: &TimelineLayout,
    viewport: u32,
    links: &Links,
) -> String {
    if view.is_empty() {
        return r#"<p class="empty">No events match the current filters.</p>"#.to_string();
    }

    let width = layout.plot_width(viewport);
    let height = layout.plot_height(view.len());
    let m = layout.margin;
    let outer_w = width + m.left + m.right;
    let outer_h = height + m.top + m.bottom;

    let min = view.iter().flat_map(|e| [e.start, e.end]).min();
    let max = view.iter().flat_map(|e| [e.start, e.end]).max();
    let (Some(min), Some(max)) = (min, max) else {
        return String::new();
    };
    let x = TimeScale::new(min, max, width);
    let y = BandScale::new(view.len(), height, layout.row_padding);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="timeline" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" role="img" aria-label="Event timeline">"#,
        w = outer_w,
        h = outer_h
    );
    let _ = write!(svg, r#"<g transform="translate({},{})">"#, m.left, m.top);

    render_grid(&mut svg, &x, height);

    // Rows
    svg.push_str(r#"<g class="rows">"#);
    for (i, event) in view.iter().enumerate() {
        let row_y = y.slot(i);
        let bar_y = y.position(i);
        let href = escape(&links.detail(event.id));
        let title = escape(&event.record.title);
        let (bar_x, bar_w) = layout.bar_extent(&x, event);
        let color = host_color(options, event.record.host());
        let shade = if i % 2 == 0 { "#f8f8f8" } else { "#ffffff" };

        let _ = write!(svg, r#"<g class="row" data-id="{}">"#, event.id);
        let _ = write!(
            svg,
            r#"<rect class="row-bg" x="0" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            row_y,
            width,
            y.step(),
            shade
        );
        let _ = write!(
            svg,
            concat!(
                r#"<a href="{href}"><rect class="timeline-bar" data-tip="tip-{id}" "#,
                r#"x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" rx="4" ry="4" fill="{color}">"#,
                r#"<title>{title}</title></rect></a>"#
            ),
            href = href,
            id = event.id,
            x = bar_x,
            y = bar_y,
            w = bar_w,
            h = y.bandwidth(),
            color = color,
            title = title
        );
        let label = truncate(&event.record.title, layout.label_max_chars, layout.label_keep_chars);
        let _ = write!(
            svg,
            concat!(
                r#"<a href="{href}"><text class="timeline-label" x="-10" y="{y:.1}" dy=".35em" text-anchor="end">"#,
                r#"{label}<title>{title}</title></text></a>"#
            ),
            href = href,
            y = bar_y + y.bandwidth() / 2.0,
            label = escape(&label),
            title = title
        );
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    render_axis(&mut svg, &x, height);

    // Info boxes go last so they paint over every row
    let bounds = Bounds {
        left: -m.left,
        top: -m.top,
        right: width + m.right,
        bottom: height + m.bottom,
    };
    svg.push_str(r#"<g class="tooltips">"#);
    for (i, event) in view.iter().enumerate() {
        let (bar_x, bar_w) = layout.bar_extent(&x, event);
        let anchor_y = y.position(i) + y.bandwidth() / 2.0;
        let (tx, ty) = place_tooltip(
            bar_x,
            bar_x + bar_w,
            anchor_y,
            (layout.tooltip_width, layout.tooltip_height),
            layout.tooltip_offset,
            bounds,
        );
        render_tooltip(&mut svg, event, layout, tx, ty);
    }
    svg.push_str("</g>");

    svg.push_str("</g></svg>");
    svg
}

fn render_grid(svg: &mut String, x: &TimeScale, height: f64) {
    svg.push_str(r#"<g class="grid">"#);
    for tick in x.ticks() {
        let _ = write!(
            svg,
            r##"<line x1="{p:.1}" x2="{p:.1}" y1="0" y2="{h:.1}" stroke="#e5e5e5" stroke-dasharray="3,3"/>"##,
            p = x.map(tick),
            h = height
        );
    }
    svg.push_str("</g>");
}

fn render_axis(svg: &mut String, x: &TimeScale, height: f64) {
    let (start, end) = x.domain();
    let _ = write!(svg, r#"<g class="x-axis" transform="translate(0,{:.1})">"#, height);
    let _ = write!(
        svg,
        r##"<line x1="{:.1}" x2="{:.1}" y1="0" y2="0" stroke="#333"/>"##,
        x.map(start),
        x.map(end)
    );
    for tick in x.ticks() {
        let p = x.map(tick);
        let _ = write!(
            svg,
            r##"<g class="tick" transform="translate({:.1},0)"><line y2="6" stroke="#333"/><text y="9" dy=".71em" text-anchor="middle">{}</text></g>"##,
            p,
            escape(&x.tick_label(tick))
        );
    }
    svg.push_str("</g>");
}

fn render_tooltip(svg: &mut String, event: &NormalizedEvent, layout: &TimelineLayout, x: f64, y: f64) {
    let details = &event.record.details;
    let start = details.start_time.as_deref().unwrap_or("");

    let mut lines = vec![format!("Start: {}", start)];
    if event.has_end {
        let end_label = details
            .end_time
            .clone()
            .unwrap_or_else(|| event.end.format("%Y/%m/%d %H:%M").to_string());
        lines.push(format!("End: {}", end_label));
    }
    let location = event.record.location();
    if !location.is_empty() {
        lines.push(truncate(location, layout.location_max_chars, layout.location_max_chars));
    }

    let _ = write!(
        svg,
        r#"<g class="tooltip" id="tip-{}" transform="translate({:.1},{:.1})" visibility="hidden" pointer-events="none">"#,
        event.id,
        x,
        y
    );
    let _ = write!(
        svg,
        r##"<rect width="{:.0}" height="{:.0}" rx="4" fill="white" stroke="#ccc"/>"##,
        layout.tooltip_width,
        layout.tooltip_height
    );
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(svg, r#"<text x="10" y="{}">{}</text>"#, 20 + i * 18, escape(line));
    }
    svg.push_str("</g>");
}

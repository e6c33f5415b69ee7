//! HTML page assembly
//!
//! Puts the filter controls, summary fields, timeline, charts and detail
//! panel(s) into one self-contained document. All drawing happens in Rust;
//! the inline script only toggles info boxes on hover and, in serve mode,
//! re-requests the page when the window is resized.

use super::charts::{self, ChartLayout};
use super::links::{Links, PageMode};
use super::timeline::{self, TimelineLayout};
use super::{detail, escape, Summary};
use crate::filter::ALL;
use crate::state::AppState;
use std::fmt::Write as _;
use std::io::{self, Write};

pub fn write<W: Write>(
    writer: &mut W,
    state: &AppState,
    mode: PageMode,
    layout: &TimelineLayout,
) -> io::Result<()> {
    writer.write_all(render_page(state, mode, layout).as_bytes())
}

pub fn render_page(state: &AppState, mode: PageMode, layout: &TimelineLayout) -> String {
    let view = state.filtered();
    let summary = Summary::from_events(&view);
    let links = Links::new(mode, state.filter(), state.viewport_width());
    let chart_layout = ChartLayout::default();

    let timeline_html = timeline::render(&view, state.options(), layout, state.viewport_width(), &links);
    let amount_chart = charts::render_amount_chart(&view, &chart_layout);
    let location_chart = charts::render_location_chart(&view, &chart_layout);

    let panels = match mode {
        PageMode::Static => view.iter().map(|e| detail::render(e, &links)).collect::<String>(),
        PageMode::Served => state
            .selected()
            .map(|e| detail::render(e, &links))
            .unwrap_or_default(),
    };

    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Ticket Timeline</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div>
                <div class="logo">Ticket Timeline</div>
                <div class="subtitle">{count} of {total} events &middot; generated {generated}</div>
            </div>
        </div>
        {warnings}
        {controls}
        <div class="stats">
            <div class="stat">
                <div class="stat-value" id="total-amount">{amount}</div>
                <div class="stat-label">Total Spent</div>
            </div>
            <div class="stat">
                <div class="stat-value" id="total-events">{count}</div>
                <div class="stat-label">Events</div>
            </div>
            <div class="stat">
                <div class="stat-value" id="total-hours">{hours}</div>
                <div class="stat-label">Hours</div>
            </div>
        </div>
        {panels}
        <div class="chart-card">
            <div class="chart-title">Timeline</div>
            <div id="timeline">{timeline}</div>
        </div>
        <div class="charts">
            <div class="chart-card">
                <div class="chart-title">Top 5 Expenses</div>
                <div id="expense-chart">{amount_chart}</div>
            </div>
            <div class="chart-card">
                <div class="chart-title">Top 5 Locations</div>
                <div id="location-chart">{location_chart}</div>
            </div>
        </div>
    </div>
    <script>{script}</script>
</body>
</html>
"#,
        css = CSS,
        count = summary.count,
        total = state.events().len(),
        generated = generated,
        warnings = render_warnings(state),
        controls = render_controls(state, mode, &links),
        amount = escape(&summary.amount_label()),
        hours = summary.hours_label(),
        panels = panels,
        timeline = timeline_html,
        amount_chart = amount_chart,
        location_chart = location_chart,
        script = script(mode),
    )
}

fn render_warnings(state: &AppState) -> String {
    let rejected = state.rejected();
    if rejected.is_empty() {
        return String::new();
    }

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<details class="warning"><summary>{} record(s) could not be placed on the timeline</summary><ul>"#,
        rejected.len()
    );
    for r in rejected {
        let _ = write!(
            html,
            "<li>#{} {}: {}</li>",
            r.index,
            escape(r.title.as_deref().unwrap_or("(untitled)")),
            escape(&r.reason)
        );
    }
    html.push_str("</ul></details>");
    html
}

fn render_controls(state: &AppState, mode: PageMode, links: &Links) -> String {
    let filter = state.filter();
    let options = state.options();

    let hosts = select(
        "host",
        "All organizers",
        options.hosts.iter().map(|h| h.as_str()),
        &filter.host,
    );
    let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    let years = select("year", "All years", years.iter().map(|y| y.as_str()), &filter.year);
    let locations = select(
        "location",
        "All locations",
        options.locations.iter().map(|l| l.as_str()),
        &filter.location,
    );

    let (disabled, note) = match mode {
        PageMode::Static => (
            " disabled",
            r#"<div class="dim">Static report. Run <code>ticketline serve</code> for interactive filtering.</div>"#,
        ),
        PageMode::Served => ("", ""),
    };

    format!(
        r#"<form class="controls" id="filters" method="get" action="/">
            <fieldset{disabled}>
                {hosts}
                {years}
                {locations}
                <input type="search" name="q" id="search-filter" placeholder="Search titles" value="{search}">
                <input type="hidden" name="width" id="viewport-width" value="{width}">
                <button type="submit">Apply</button>
                <a class="reset" id="reset-filter" href="{reset}">Reset</a>
            </fieldset>
            {note}
        </form>"#,
        disabled = disabled,
        hosts = hosts,
        years = years,
        locations = locations,
        search = escape(&filter.search),
        width = state.viewport_width(),
        reset = escape(&links.reset()),
        note = note,
    )
}

fn select<'a>(
    name: &str,
    all_label: &str,
    values: impl Iterator<Item = &'a str>,
    current: &str,
) -> String {
    let mut html = format!(
        r#"<select name="{name}" id="{name}-filter" class="auto-submit"><option value="{all}">{label}</option>"#,
        name = name,
        all = ALL,
        label = escape(all_label)
    );
    for value in values {
        let selected = if value == current { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{v}"{s}>{v}</option>"#,
            v = escape(value),
            s = selected
        );
    }
    html.push_str("</select>");
    html
}

fn script(mode: PageMode) -> String {
    let mut js = String::from(TOOLTIP_JS);
    if mode == PageMode::Served {
        js.push_str(SERVED_JS);
    }
    js
}

const TOOLTIP_JS: &str = r#"
document.querySelectorAll('[data-tip]').forEach(function (bar) {
    var tip = document.getElementById(bar.getAttribute('data-tip'));
    if (!tip) return;
    bar.addEventListener('mouseenter', function () { tip.setAttribute('visibility', 'visible'); });
    bar.addEventListener('mouseleave', function () { tip.setAttribute('visibility', 'hidden'); });
});
"#;

const SERVED_JS: &str = r#"
document.querySelectorAll('select.auto-submit').forEach(function (el) {
    el.addEventListener('change', function () { el.form.submit(); });
});
(function () {
    var current = parseInt(document.getElementById('viewport-width').value, 10);
    var timer = null;
    function redraw() {
        var width = window.innerWidth;
        if (Math.abs(width - current) < 20) return;
        var params = new URLSearchParams(window.location.search);
        params.set('width', width);
        window.location.search = params.toString();
    }
    window.addEventListener('resize', function () {
        clearTimeout(timer);
        timer = setTimeout(redraw, 250);
    });
    redraw();
})();
"#;

const CSS: &str = r#"
:root {
    --bg: #f6f7f9;
    --card: #ffffff;
    --border: #dde1e6;
    --text: #222;
    --dim: #6b7280;
    --accent: #0066cc;
    --warn: #b45309;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans TC', Helvetica, Arial, sans-serif;
    background: var(--bg);
    color: var(--text);
    line-height: 1.5;
}
.container { max-width: 1280px; margin: 0 auto; padding: 1.5rem 20px; }
.header { display: flex; align-items: center; margin-bottom: 1.5rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }
.logo { font-size: 2rem; font-weight: 800; color: #7AB80E; }
.subtitle, .dim { color: var(--dim); font-size: 0.9rem; }
.warning { border: 1px solid var(--warn); color: var(--warn); border-radius: 8px; padding: 0.75rem 1rem; margin-bottom: 1rem; background: #fffbeb; }
.warning ul { margin: 0.5rem 0 0 1.25rem; }
.controls { margin-bottom: 1.5rem; }
.controls fieldset { border: none; display: flex; flex-wrap: wrap; gap: 0.5rem; align-items: center; }
.controls select, .controls input, .controls button { padding: 0.4rem 0.6rem; border: 1px solid var(--border); border-radius: 6px; background: var(--card); font-size: 0.9rem; }
.controls .reset { color: var(--accent); margin-left: 0.5rem; }
.stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; margin-bottom: 1.5rem; }
.stat, .chart-card { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.25rem; }
.stat { text-align: center; }
.stat-value { font-size: 2rem; font-weight: 700; line-height: 1.1; }
.stat-label { color: var(--dim); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.4rem; }
.chart-card { margin-bottom: 1.5rem; overflow-x: auto; }
.chart-title { font-weight: 600; color: var(--dim); margin-bottom: 0.75rem; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 1.5rem; }
.empty { color: var(--dim); padding: 1rem 0; }
svg text { font-size: 12px; fill: #333; }
.timeline .row:hover .row-bg { fill: #eaf2ff; }
.timeline-bar { cursor: pointer; }
.timeline-bar:hover { stroke: #333; stroke-width: 1.5; }
.timeline-label { cursor: pointer; }
.timeline-label:hover { fill: var(--accent); }
.tooltip text { font-size: 12px; }
.chart-bar:hover { opacity: 0.8; }
.detail-panel { display: none; background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; margin-bottom: 1.5rem; }
.detail-panel.active, .detail-panel:target { display: block; }
.detail-header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 1rem; }
.detail-header h2 { font-size: 1.25rem; }
.detail-close { font-size: 1.5rem; color: var(--dim); text-decoration: none; padding: 0 0.5rem; }
.detail-close:hover { color: var(--text); }
.event-thumbnail img { max-width: 320px; border-radius: 8px; margin-bottom: 1rem; }
.event-info { border-collapse: collapse; margin-bottom: 1rem; }
.event-info th, .event-info td { text-align: left; padding: 0.4rem 1rem 0.4rem 0; border-bottom: 1px solid var(--border); }
.event-info th { color: var(--dim); font-weight: 600; white-space: nowrap; }
.event-actions { display: flex; flex-wrap: wrap; gap: 0.5rem; }
.action-button { display: inline-block; padding: 0.4rem 0.9rem; border-radius: 6px; background: #7AB80E; color: white; text-decoration: none; font-size: 0.9rem; }
.action-button.disabled { background: #c7cbd1; color: #555; cursor: not-allowed; }
"#;

//! Detail panel for a single event

use super::escape;
use super::links::{detail_anchor, Links, PageMode};
use crate::normalize::NormalizedEvent;
use std::fmt::Write as _;

/// Render the read-only panel for `event`.
///
/// In a static report every visible event gets a panel and CSS shows the
/// one targeted by the URL fragment. In serve mode only the selected event
/// is rendered, already open.
pub fn render(event: &NormalizedEvent, links: &Links) -> String {
    let record = &event.record;
    let details = &record.details;
    let class = match links.mode {
        PageMode::Static => "detail-panel",
        PageMode::Served => "detail-panel active",
    };

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<section class="{}" id="{}" aria-label="Event details">"#,
        class,
        detail_anchor(event.id)
    );

    // Header
    html.push_str(r#"<div class="detail-header">"#);
    let title = escape(&record.title);
    match record.event_url.as_deref() {
        Some(url) if !url.is_empty() => {
            let _ = write!(
                html,
                r#"<h2><a href="{}" target="_blank" rel="noopener">{}</a></h2>"#,
                escape(url),
                title
            );
        }
        _ => {
            let _ = write!(html, "<h2>{}</h2>", title);
        }
    }
    let _ = write!(
        html,
        r#"<a class="detail-close" href="{}" aria-label="Close">&times;</a>"#,
        escape(&links.close())
    );
    html.push_str("</div>");

    if let Some(thumb) = record.thumbnail_url.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(
            html,
            r#"<div class="event-thumbnail"><img src="{}" alt="{}"></div>"#,
            escape(thumb),
            title
        );
    }

    // Fields
    html.push_str(r#"<table class="event-info">"#);
    let rows: [(&str, &str); 7] = [
        ("Order No.", record.order_number.as_str()),
        ("Start Time", details.start_time.as_deref().unwrap_or("")),
        ("Location", record.location()),
        ("Organizer", record.host()),
        ("Ticket Type", details.ticket_types.as_deref().unwrap_or("")),
        ("Quantity", details.tickets.as_deref().unwrap_or("")),
        ("Amount", details.amount.as_deref().unwrap_or("")),
    ];
    for (label, value) in rows {
        let _ = write!(html, "<tr><th>{}</th><td>{}</td></tr>", label, escape(value));
    }
    if let Some(receipt) = &details.receipt {
        let number = escape(&receipt.number);
        let cell = match receipt.url.as_deref() {
            Some(url) if !url.is_empty() => format!(
                r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                escape(url),
                number
            ),
            _ => number,
        };
        let _ = write!(html, "<tr><th>Receipt</th><td>{}</td></tr>", cell);
    }
    html.push_str("</table>");

    // Actions
    if !record.actions.is_empty() {
        html.push_str(r#"<div class="event-actions">"#);
        for action in &record.actions {
            let href = escape(action.url.as_deref().unwrap_or("#"));
            if action.disabled {
                let _ = write!(
                    html,
                    r#"<a href="{}" class="action-button disabled" aria-disabled="true" target="_blank" rel="noopener">{}</a>"#,
                    href,
                    escape(&action.label)
                );
            } else {
                let _ = write!(
                    html,
                    r#"<a href="{}" class="action-button" target="_blank" rel="noopener">{}</a>"#,
                    href,
                    escape(&action.label)
                );
            }
        }
        html.push_str("</div>");
    }

    html.push_str("</section>");
    html
}

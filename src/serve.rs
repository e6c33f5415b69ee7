//! HTTP server for interactive browsing
//!
//! `ticketline serve ./dumps` → loads the newest dump, starts the server,
//! opens the browser.
//!
//! The server owns the one [`AppState`]. Every GET carries the full page
//! state (filter, width, open panel) in its query string, is applied to the
//! state, and the page is re-rendered from it.

use crate::error::{Error, Result};
use crate::report::json;
use crate::report::links::PageQuery;
use crate::report::{html, PageMode, TimelineLayout};
use crate::state::AppState;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

/// What a request resolved to, before it touches the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json<T: Serialize>(data: T) -> Self {
        match serde_json::to_string(&ApiResponse::success(data)) {
            Ok(body) => Self { status: 200, content_type: "application/json", body },
            Err(e) => {
                let failure: ApiResponse<()> = ApiResponse {
                    ok: false,
                    data: None,
                    error: Some(e.to_string()),
                };
                Self {
                    status: 500,
                    content_type: "application/json",
                    body: serde_json::to_string(&failure).unwrap_or_default(),
                }
            }
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            body: "Not found".to_string(),
        }
    }
}

/// Start server, open browser, serve pages until the process is killed
pub fn start(port: u16, mut state: AppState, layout: TimelineLayout) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| Error::Server(e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32m🎫 Ticketline\x1b[0m");
    eprintln!("   {}", url);
    eprintln!(
        "   {} events, {} skipped\n",
        state.events().len(),
        state.rejected().len()
    );
    info!(%addr, "serving timeline");

    if let Err(e) = open::that(&url) {
        warn!("could not open browser: {}", e);
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut state, &layout) {
            warn!("failed to respond: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, state: &mut AppState, layout: &TimelineLayout) -> std::io::Result<()> {
    let url = request.url().to_string();
    let reply = route(state, request.method(), &url, layout);
    debug!(method = %request.method(), %url, status = reply.status, "request");

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Some(header) = content_type(reply.content_type) {
        response = response.with_header(header);
    }
    request.respond(response)
}

fn content_type(value: &str) -> Option<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).ok()
}

/// Apply a request to `state` and produce the response body.
pub fn route(state: &mut AppState, method: &Method, url: &str, layout: &TimelineLayout) -> Reply {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };

    match (method, path) {
        (&Method::Get, "/") => {
            let query = PageQuery::parse(query);
            state.apply_filter(query.filter());
            if let Some(width) = query.width() {
                state.resize(width);
            }
            match query.event() {
                Some(id) => {
                    if !state.select(id) {
                        debug!(id, "ignoring event id outside the current view");
                        state.close_detail();
                    }
                }
                None => state.close_detail(),
            }
            Reply::html(html::render_page(state, PageMode::Served, layout))
        }

        // Selectors and search cleared; the viewport width survives
        (&Method::Get, "/reset") => {
            state.reset();
            state.close_detail();
            if let Some(width) = PageQuery::parse(query).width() {
                state.resize(width);
            }
            Reply::html(html::render_page(state, PageMode::Served, layout))
        }

        (&Method::Get, "/api/events") => Reply::json(json::build(state)),

        (&Method::Get, "/api/options") => Reply::json(state.options()),

        _ => Reply::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDetails, EventRecord};

    fn record(title: &str, host: &str, start: &str) -> EventRecord {
        EventRecord {
            title: title.to_string(),
            order_number: title.to_lowercase(),
            thumbnail_url: None,
            event_url: None,
            details: EventDetails {
                start_time: Some(start.to_string()),
                host: Some(host.to_string()),
                location: Some("Taipei".to_string()),
                amount: Some("NT$500".to_string()),
                ..Default::default()
            },
            actions: vec![],
        }
    }

    fn state() -> AppState {
        AppState::new(vec![
            record("Event A", "Acme", "2024/01/10"),
            record("Event B", "Acme", "2024/02/01"),
            record("Event C", "Other", "2023/06/01"),
        ])
    }

    fn get(state: &mut AppState, url: &str) -> Reply {
        route(state, &Method::Get, url, &TimelineLayout::default())
    }

    // ==========================================================================
    // PAGE ROUTE TESTS
    // ==========================================================================

    #[test]
    fn test_index_renders_page() {
        let mut state = state();
        let reply = get(&mut state, "/");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(reply.body.contains(r#"id="timeline""#));
        assert_eq!(state.filtered().len(), 3);
    }

    #[test]
    fn test_query_applies_filter_and_width() {
        let mut state = state();
        let reply = get(&mut state, "/?host=Acme&year=all&width=800");
        assert_eq!(reply.status, 200);
        assert_eq!(state.filtered().len(), 2);
        assert_eq!(state.viewport_width(), 800);
    }

    #[test]
    fn test_event_param_opens_detail() {
        let mut state = state();
        let reply = get(&mut state, "/?event=2");
        assert_eq!(state.selected().map(|e| e.id), Some(2));
        assert!(reply.body.contains("detail-panel active"));

        get(&mut state, "/?host=Acme");
        assert!(state.selected().is_none(), "no event param closes the panel");
    }

    #[test]
    fn test_event_hidden_by_filter_stays_closed() {
        let mut state = state();
        let reply = get(&mut state, "/?host=Acme&event=2");
        assert_eq!(reply.status, 200);
        assert!(state.selected().is_none(), "Event C belongs to Other");
        assert!(!reply.body.contains("detail-panel active"));
    }

    #[test]
    fn test_bad_params_degrade_gracefully() {
        let mut state = state();
        let reply = get(&mut state, "/?width=wide&event=abc");
        assert_eq!(reply.status, 200);
        assert_eq!(state.viewport_width(), crate::state::DEFAULT_VIEWPORT_WIDTH);
        assert!(state.selected().is_none());

        get(&mut state, "/?event=99");
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_reset_keeps_width() {
        let mut state = state();
        get(&mut state, "/?host=Other&q=event&width=900");
        assert_eq!(state.filtered().len(), 1);

        let reply = get(&mut state, "/reset?width=900");
        assert_eq!(reply.status, 200);
        assert_eq!(state.filtered().len(), 3);
        assert_eq!(state.viewport_width(), 900);
        assert!(!state.filter().is_active());
    }

    // ==========================================================================
    // API ROUTE TESTS
    // ==========================================================================

    #[test]
    fn test_api_events_follows_current_filter() {
        let mut state = state();
        get(&mut state, "/?host=Other");
        let reply = get(&mut state, "/api/events");
        assert_eq!(reply.content_type, "application/json");

        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["events"].as_array().unwrap().len(), 1);
        assert_eq!(value["data"]["events"][0]["title"], "Event C");
    }

    #[test]
    fn test_api_options_lists_full_collection() {
        let mut state = state();
        get(&mut state, "/?host=Other");
        let reply = get(&mut state, "/api/options");

        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(value["data"]["hosts"], serde_json::json!(["Acme", "Other"]));
        assert_eq!(value["data"]["years"], serde_json::json!([2024, 2023]));
    }

    #[test]
    fn test_unknown_route_is_404() {
        let mut state = state();
        assert_eq!(get(&mut state, "/favicon.ico").status, 404);
        assert_eq!(route(&mut state, &Method::Post, "/", &TimelineLayout::default()).status, 404);
    }
}

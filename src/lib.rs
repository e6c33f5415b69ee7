//! Ticketline - browse your ticket purchase history as a timeline
//!
//! Ticketline reads the JSON order dump produced by a ticketing-site scraper
//! and turns it into one page: a horizontal timeline with one bar per
//! attended event, two summary charts, totals, and a detail panel for each
//! order.
//!
//! # Pipeline
//!
//! 1. **Load** ([`loader`]): read a dump file, or the newest
//!    `orders_*.json` under a directory.
//! 2. **Normalize** ([`normalize`]): parse the site's display strings
//!    (`2024/01/10 19:00(Wed) ~ 21:00`, `NT$1,200`) into timestamps,
//!    amounts, and hours. Records without a usable start are rejected and
//!    reported, never guessed.
//! 3. **Filter** ([`filter`]): host, year, location, and title search,
//!    always applied to the full collection.
//! 4. **Render** ([`report`]): SVG timeline and charts inside a standalone
//!    HTML page, or a JSON/CSV export of the filtered view.
//!
//! # Quick Start
//!
//! ```no_run
//! use ticketline::{loader, AppState, FilterParams, TimelineLayout};
//!
//! let dump = loader::load("dumps/").unwrap();
//! let mut state = AppState::from_dump(dump);
//! state.apply_filter(FilterParams::default().with_year("2024"));
//!
//! ticketline::report::generate("timeline.html", &state, &TimelineLayout::default()).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`state`]: the collection, the current filter, and the open panel
//! - [`report`]: HTML/SVG, JSON and CSV output
//! - [`serve`]: local HTTP server that re-renders the page per request

pub mod error;
pub mod event;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod report;
pub mod serve;
pub mod state;

pub use error::{Error, Result};
pub use event::EventRecord;
pub use filter::{FilterOptions, FilterParams};
pub use normalize::{NormalizedEvent, Rejected};
pub use report::TimelineLayout;
pub use state::AppState;

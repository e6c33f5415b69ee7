use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use ticketline::report::Summary;
use ticketline::{loader, AppState, FilterParams, TimelineLayout};
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "TICKETLINE_LOG";

#[derive(Parser, Debug)]
#[command(name = "ticketline")]
#[command(author, version, about = "Render a ticket purchase history as an interactive timeline")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Order dump (.json) or a directory containing orders_*.json dumps
    path: Option<PathBuf>,

    /// Launch GUI file picker (auto-enabled when double-clicked)
    #[arg(long)]
    gui: bool,

    /// Output file (.html, .json, .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "ticketline-reports")]
    report_dir: PathBuf,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,

    /// Only events from this host
    #[arg(long)]
    host: Option<String>,

    /// Only events starting in this year
    #[arg(long)]
    year: Option<String>,

    /// Only events at this location
    #[arg(long)]
    location: Option<String>,

    /// Case-insensitive title search
    #[arg(short, long)]
    search: Option<String>,

    /// Viewport width the page is laid out for
    #[arg(long)]
    width: Option<u32>,

    /// Log filter, e.g. "debug" or "ticketline=trace" (default: $TICKETLINE_LOG or "warn")
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a local server and browse the timeline interactively
    Serve {
        /// Order dump or directory of dumps
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    if let Some(Command::Serve { path, port }) = args.command {
        let state = match loader::load(&path) {
            Ok(dump) => AppState::from_dump(dump),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = ticketline::serve::start(port, state, TimelineLayout::default()) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // With GUI feature: launch GUI if --gui flag OR no path provided
    #[cfg(feature = "gui")]
    let use_gui = args.gui || args.path.is_none();

    #[cfg(not(feature = "gui"))]
    let use_gui = {
        if args.gui {
            eprintln!("Note: GUI mode not available in this build.");
        }
        false
    };

    let path = match args.path.clone() {
        Some(p) if !use_gui => p,
        _ => match pick_path(use_gui) {
            Some(p) => p,
            None => std::process::exit(if use_gui { 0 } else { 1 }),
        },
    };

    let dump = match loader::load(&path) {
        Ok(dump) => dump,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let source = dump.path.clone();
    let mut state = AppState::from_dump(dump);

    state.apply_filter(FilterParams {
        host: args.host.clone().unwrap_or_default(),
        year: args.year.clone().unwrap_or_default(),
        location: args.location.clone().unwrap_or_default(),
        search: args.search.clone().unwrap_or_default(),
    });
    if let Some(width) = args.width {
        state.resize(width);
    }

    if !args.quiet {
        eprintln!("\x1b[1mTicketline - Purchase History Timeline\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Source: {}", source.display());
        eprintln!("Loaded {} event(s)", state.events().len());
        for rejected in state.rejected() {
            eprintln!(
                "  \x1b[33mskipped\x1b[0m #{} {}: {}",
                rejected.index,
                rejected.title.as_deref().unwrap_or("(untitled)"),
                rejected.reason
            );
        }

        let view = state.filtered();
        let summary = Summary::from_events(&view);
        eprintln!("\n\x1b[1mSummary:\x1b[0m");
        eprintln!("  Events:      {}", summary.count);
        eprintln!("  Total spent: {}", summary.amount_label());
        eprintln!("  Hours:       {}", summary.hours_label());
    }

    let report_path = match args.output.clone() {
        Some(output) => output,
        None => {
            if let Err(e) = std::fs::create_dir_all(&args.report_dir) {
                eprintln!("Failed to create {}: {}", args.report_dir.display(), e);
                std::process::exit(1);
            }
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            args.report_dir.join(format!("timeline_{}.html", timestamp))
        }
    };

    if let Err(e) = ticketline::report::generate(&report_path, &state, &TimelineLayout::default()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if !args.quiet {
        eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", report_path.display());
    }

    if !args.no_open {
        if use_gui {
            // In GUI mode, auto-open the report (no prompt)
            let _ = open::that(&report_path);
        } else if !args.quiet && prompt("\nOpen report in browser? [Y/n] ") {
            if let Err(e) = open::that(&report_path) {
                eprintln!("Failed to open report: {}", e);
            }
        }
    }
}

/// Filter from `--log-level`, then `$TICKETLINE_LOG`, then "warn"
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn prompt(question: &str) -> bool {
    eprint!("{}", question);
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    let input = input.trim().to_lowercase();
    input.is_empty() || input == "y" || input == "yes"
}

#[cfg(feature = "gui")]
fn pick_path(use_gui: bool) -> Option<PathBuf> {
    if !use_gui {
        return usage();
    }
    let picked = rfd::FileDialog::new()
        .set_title("Select order dump")
        .add_filter("Order dump", &["json"])
        .pick_file()
        .or_else(|| {
            rfd::FileDialog::new()
                .set_title("Select folder containing orders_*.json")
                .pick_folder()
        });
    if picked.is_none() {
        eprintln!("No file or folder selected.");
    }
    picked
}

#[cfg(not(feature = "gui"))]
fn pick_path(_use_gui: bool) -> Option<PathBuf> {
    usage()
}

fn usage() -> Option<PathBuf> {
    eprintln!("Usage: ticketline <PATH>");
    eprintln!("Run 'ticketline --help' for more options.");
    #[cfg(not(feature = "gui"))]
    eprintln!("Note: GUI mode not available in this build.");
    None
}

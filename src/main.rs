// Entry point and interactive menu.
//
// One `Session` owns the loaded table and the current filter selection.
// Every menu action that changes the selection is followed by a full
// re-run of filter, metrics and aggregations when the dashboard is shown.
mod aggregate;
mod cache;
mod config;
mod error;
mod filter;
mod loader;
mod logging;
mod metrics;
mod output;
mod render;
mod session;
mod table;
mod types;
mod util;

use aggregate::Measure;
use clap::Parser;
use config::DashboardConfig;
use error::DashboardError;
use filter::CancellationFilter;
use log::error;
use session::Session;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "hotel_dashboard", version, about = "Hotel booking analytics dashboard", long_about = None)]
struct Cli {
    /// Optional JSON config file (defaults to ./dashboard.json when present)
    config: Option<PathBuf>,
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Offer `options` with an "All" entry at [0]. Returns `Some(None)` for All.
fn pick_option(title: &str, options: &[String]) -> Option<Option<String>> {
    println!("{}", title);
    println!("[0] All");
    for (i, o) in options.iter().enumerate() {
        println!("[{}] {}", i + 1, o);
    }
    loop {
        let choice = read_choice()?;
        match choice.parse::<usize>() {
            Ok(0) => return Some(None),
            Ok(n) if n <= options.len() => return Some(Some(options[n - 1].clone())),
            _ => println!("Invalid choice. Please enter 0-{}.", options.len()),
        }
    }
}

/// Option [1]: load (or reuse) the configured CSV file. The error is
/// printed here and handed back so startup can abort on it.
fn handle_load(session: &mut Session, force: bool) -> Result<(), DashboardError> {
    let result = if force { session.reload() } else { session.load() };
    match result {
        Ok(outcome) if outcome.from_cache => {
            println!("Data unchanged, using the loaded table.\n");
        }
        Ok(outcome) => {
            let r = outcome.report;
            println!(
                "Processing dataset... ({} rows read, {} loaded)",
                util::format_int(r.total_rows as u64),
                util::format_int(r.loaded_rows as u64)
            );
            if r.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(r.parse_errors as u64)
                );
            }
            println!();
        }
        Err(e) => {
            error!("{}", e);
            println!("Failed to load file: {}\n", e);
            return Err(e);
        }
    }
    Ok(())
}

/// The first load is not optional: without data there is no dashboard.
fn start_session(config: DashboardConfig) -> Result<Session, DashboardError> {
    let mut session = Session::new(config);
    handle_load(&mut session, false)?;
    Ok(session)
}

fn handle_year_range(session: &mut Session) -> Option<()> {
    let (lo, hi) = match session.options() {
        Ok(o) => (o.year_min, o.year_max),
        Err(e) => {
            println!("Error: {}. Please load the CSV file first (option 1).\n", e);
            return Some(());
        }
    };
    println!("Booking year range ({}-{})", lo, hi);
    let from = read_line(&format!("From year [{}]: ", lo))?;
    let to = read_line(&format!("To year [{}]: ", hi))?;
    let parse = |s: &str, default: i32| {
        if s.is_empty() {
            Some(default)
        } else {
            s.parse::<i32>().ok()
        }
    };
    match (parse(&from, lo), parse(&to, hi)) {
        (Some(a), Some(b)) => match session.set_year_range(a, b) {
            Ok(()) => println!("Year range set to {}-{}.\n", a, b),
            Err(e) => println!("Error: {}\n", e),
        },
        _ => println!("Invalid year.\n"),
    }
    Some(())
}

fn handle_category_filters(session: &mut Session) -> Option<()> {
    let options = match session.options() {
        Ok(o) => o.clone(),
        Err(e) => {
            println!("Error: {}. Please load the CSV file first (option 1).\n", e);
            return Some(());
        }
    };
    let hotel = pick_option("Hotel type:", &options.hotels)?;
    if let Err(e) = session.set_hotel(hotel) {
        println!("Error: {}\n", e);
    }
    let segment = pick_option("Market segment:", &options.market_segments)?;
    if let Err(e) = session.set_market_segment(segment) {
        println!("Error: {}\n", e);
    }
    println!();
    Some(())
}

fn handle_cancellation(session: &mut Session) -> Option<()> {
    println!("Cancelled bookings:");
    println!("[1] Include");
    println!("[2] Exclude by reservation status");
    println!("[3] Exclude by cancellation flag");
    let choice = match read_choice()?.as_str() {
        "1" => CancellationFilter::Keep,
        "2" => CancellationFilter::ExcludeByStatus,
        "3" => CancellationFilter::ExcludeByFlag,
        _ => {
            println!("Invalid choice.\n");
            return Some(());
        }
    };
    match session.set_cancellation(choice) {
        Ok(()) => println!("Cancelled bookings: {}.\n", choice.label()),
        Err(e) => println!("Error: {}\n", e),
    }
    Some(())
}

fn handle_metric(session: &mut Session) -> Option<()> {
    println!("Select metric:");
    println!("[1] Revenue");
    println!("[2] Booking");
    println!("[3] Room nights");
    match read_choice()?.as_str() {
        "1" => session.set_measure(Measure::Revenue),
        "2" => session.set_measure(Measure::Bookings),
        "3" => session.set_measure(Measure::Nights),
        _ => println!("Invalid choice."),
    }
    println!();
    Some(())
}

/// Option [6]: run the pipeline, print every panel and export the data.
fn handle_show(session: &Session) {
    if !session.is_loaded() {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    }
    let snap = match session.snapshot() {
        Ok(s) => s,
        Err(e) => {
            println!("Error: {}. Please load the CSV file first (option 1).\n", e);
            return;
        }
    };
    render::print_dashboard(&snap, session.config().preview_rows);
    match render::export(&snap, &session.config().output_dir) {
        Ok(files) => println!(
            "(Chart data exported to {}, {} files)\n",
            session.config().output_dir.display(),
            files.len()
        ),
        Err(e) => {
            error!("{}", e);
            eprintln!("Write error: {}", e);
        }
    }
}

fn run(session: &mut Session) -> Option<()> {
    loop {
        println!("Hotel Booking Dashboard");
        println!("[1] Load the file");
        println!("[2] Set year range");
        println!("[3] Filter hotel type / market segment");
        println!("[4] Cancelled bookings");
        println!("[5] Select metric ({})", session.measure().label());
        println!("[6] Show dashboard");
        println!("[7] Reload the file");
        println!("[0] Exit\n");
        match read_choice()?.as_str() {
            "1" => {
                let _ = handle_load(session, false);
            }
            "2" => handle_year_range(session)?,
            "3" => handle_category_filters(session)?,
            "4" => handle_cancellation(session)?,
            "5" => handle_metric(session)?,
            "6" => {
                println!();
                handle_show(session);
            }
            "7" => {
                let _ = handle_load(session, true);
            }
            "0" => return Some(()),
            _ => println!("Invalid choice. Please enter 0-7.\n"),
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    let config = match DashboardConfig::resolve(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Ok(level) = config.level_filter() {
        if let Err(e) = logging::init(level) {
            eprintln!("Logger unavailable: {}", e);
        }
    }

    let mut session = match start_session(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot start the dashboard: {}", e);
            return ExitCode::FAILURE;
        }
    };
    run(&mut session);
    println!("Exiting the program.");
    ExitCode::SUCCESS
}

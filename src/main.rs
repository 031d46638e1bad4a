// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

// Use library instead of local modules
use car_rental::{
    book_from_form_at, load_catalog, load_for_rewrite, save_catalog, search, Car, Catalog, Config,
    LoadReport, SearchQuery,
};

const USAGE: &str = "\
Usage: car-rental [--catalog PATH] [COMMAND]

Commands:
  list                                         Show every car in the catalog
  search [--year Y] [--name N] [--company C]   Filter the catalog
  book <CODE> <LEGAL NAME> <DAYS> [--json]     Price a rental and print the receipt
  save                                         Rewrite the catalog file
  (none)                                       Interactive mode";

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config = Config::from_env();
    if let Some(path) = take_option(&mut args, "--catalog")? {
        config = config.with_catalog_path(path);
    }

    let interactive = args.is_empty() && cfg!(feature = "tui");
    init_tracing(&config, log_target(&config, interactive))?;

    match args.first().map(String::as_str) {
        None => run_ui_mode(&config),
        Some("list") => run_list(&config),
        Some("search") => run_search(&config, &mut args[1..].to_vec()),
        Some("book") => run_book(&config, &mut args[1..].to_vec()),
        Some("save") => run_save(&config),
        Some("help") | Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => {
            eprintln!("{}", USAGE);
            bail!("Unknown command: {}", other)
        }
    }
}

#[derive(Debug, PartialEq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

// Commands log to stderr so receipts and JSON on stdout stay clean. The TUI
// owns the whole terminal, so there logs go to a file or nowhere.
fn log_target(config: &Config, interactive: bool) -> LogTarget {
    match (&config.log_file, interactive) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Discard,
        (None, false) => LogTarget::Stderr,
    }
}

fn init_tracing(config: &Config, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init()
        }
        LogTarget::Discard => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

/// Remove `flag VALUE` from `args`, returning VALUE
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{} needs a value", flag);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|a| a == flag) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

/// Load the catalog, reporting problems but never stopping on them
fn open_catalog(config: &Config) -> LoadReport {
    let (report, err) = load_catalog(&config.catalog_path);
    if let Some(err) = err {
        eprintln!("❌ {}", err);
    }
    for issue in report.issues.iter() {
        eprintln!("⚠️  {}", issue.describe());
    }
    report
}

fn print_cars<'a>(cars: impl IntoIterator<Item = &'a Car>) {
    println!(
        "{:<8} {:<6} {:<24} {:<20} {:>8}",
        "Code", "Year", "Name", "Company", "Rate"
    );
    for car in cars {
        println!(
            "{:<8} {:<6} {:<24} {:<20} {:>8.2}",
            car.code, car.year, car.name, car.company, car.rate
        );
    }
}

fn run_list(config: &Config) -> Result<()> {
    let report = open_catalog(config);
    print_cars(report.catalog.iter());
    Ok(())
}

fn run_search(config: &Config, args: &mut Vec<String>) -> Result<()> {
    let year = take_option(args, "--year")?.unwrap_or_default();
    let name = take_option(args, "--name")?.unwrap_or_default();
    let company = take_option(args, "--company")?.unwrap_or_default();
    if let Some(extra) = args.first() {
        bail!("Unexpected search argument: {}", extra);
    }

    let report = open_catalog(config);
    let query = SearchQuery::from_form(&year, &name, &company);
    let results = search(&report.catalog, &query);

    if results.is_empty() {
        println!("No matching cars found.");
    } else {
        print_cars(results);
    }
    Ok(())
}

fn run_book(config: &Config, args: &mut Vec<String>) -> Result<()> {
    let json = take_flag(args, "--json");
    let [code, name, days] = args.as_slice() else {
        eprintln!("{}", USAGE);
        bail!("book needs <CODE> <LEGAL NAME> <DAYS>");
    };

    let report = open_catalog(config);
    let receipt = book_from_form_at(&report.catalog, code, name, days, chrono::Local::now())
        .context("Please ensure all fields are correctly filled")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{}", receipt.render());
    }
    Ok(())
}

fn run_save(config: &Config) -> Result<()> {
    let report = load_for_rewrite(&config.catalog_path)
        .context("Not saving: the existing car catalog could not be read")?;
    for issue in report.rejected() {
        eprintln!("⚠️  Dropping {}", issue.describe());
    }
    save_or_report(config, &report.catalog)?;
    println!("✓ Saved {} cars to {}", report.catalog.len(), config.catalog_path.display());
    Ok(())
}

fn save_or_report(config: &Config, catalog: &Catalog) -> Result<()> {
    match save_catalog(&config.catalog_path, catalog) {
        None => Ok(()),
        Some(err) => Err(err).context("Failed to save the car catalog"),
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let (report, err) = load_catalog(&config.catalog_path);
    let loaded = err.is_none();
    let notice = (report.rejected_count() > 0).then(|| report.summary());

    let mut app = ui::App::new(report.catalog, config.catalog_path.clone());
    if let Some(err) = err {
        app.set_error(err.to_string());
    } else if let Some(notice) = notice {
        app.set_info(notice);
    }

    ui::run_ui(&mut app)?;

    // Never write back a file that could not be read in the first place
    if loaded {
        if let Some(err) = app.save_on_exit() {
            eprintln!("❌ Failed to save the car catalog: {}", err);
        }
    }
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(config: &Config) -> Result<()> {
    eprintln!("Interactive mode not available, rebuild with --features tui");
    run_list(config)
}

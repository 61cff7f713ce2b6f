//! # frontpage_records
//!
//! Two small tools behind one binary:
//!
//! - **scrape**: fetch a news aggregator's front page (Hacker News by
//!   default) and write every `(title, link)` listing as a JSON array
//! - **projects**: insert, query, aggregate and update software project
//!   records kept in a JSON document collection
//!
//! ## Usage
//!
//! ```sh
//! frontpage_records scrape -o hacker_news.json
//! frontpage_records projects --db projects.json demo
//! frontpage_records projects find --category languages --value Python
//! ```
//!
//! Record operations never abort the process: a rejected operation prints
//! its error and the command exits normally. Fetch, parse and collection
//! IO failures are returned from `main`.

use clap::Parser;
use serde_json::{Map, Value};
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod records;
mod scrapers;
mod utils;

use cli::{Cli, Command, ProjectsAction, ProjectsArgs, ScrapeArgs};
use config::{Config, RecordsConfig, ScrapeConfig};
use models::{sample_project, ProjectRecord, TechCategory};
use outputs::{console, json};
use records::store::{MemoryStore, ProjectStore};
use records::RecordManager;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref()).await?;

    match args.command {
        Command::Scrape(scrape_args) => run_scrape(scrape_args, config.scrape).await?,
        Command::Projects(projects_args) => run_projects(projects_args, config.records).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Scrape the configured page and write its listings.
#[instrument(level = "info", skip_all, fields(output = %args.output))]
async fn run_scrape(args: ScrapeArgs, mut config: ScrapeConfig) -> Result<(), Box<dyn Error>> {
    args.apply(&mut config);

    // Fail before the network round trip if the output cannot be written.
    if args.output != "-" {
        ensure_writable_parent(&args.output).await?;
    }

    let client = scrapers::hacker_news::build_client(&config.user_agent)?;
    let listings = scrapers::hacker_news::scrape_listings(&client, &config).await?;
    json::write_listings(&listings, &args.output).await?;
    Ok(())
}

/// Load the collection, run one action, and save it back if anything changed.
#[instrument(level = "info", skip_all)]
async fn run_projects(args: ProjectsArgs, mut config: RecordsConfig) -> Result<(), Box<dyn Error>> {
    args.apply(&mut config);
    let db_path = config.database;
    info!(db = %db_path.display(), "Opening project collection");

    let store = MemoryStore::load(&db_path).await?;
    let mut manager = RecordManager::new(store);
    if manager.store().is_empty() {
        info!("Collection is empty");
    } else {
        info!(projects = manager.store().len(), "Collection ready");
    }

    let changed = match args.action {
        ProjectsAction::Insert { file } => {
            let record = read_record(&file).await?;
            insert_project(&mut manager, record)
        }
        ProjectsAction::Find { category, value } => {
            find_projects(&manager, category, &value);
            false
        }
        ProjectsAction::FindName { name } => {
            show_project(&manager, &name);
            false
        }
        ProjectsAction::TopLanguages => {
            show_top_languages(&manager);
            false
        }
        ProjectsAction::UpdateMetrics { name, metrics } => {
            update_project_metrics(&mut manager, &name, &metrics)
        }
        ProjectsAction::Demo => {
            run_demo(&mut manager);
            true
        }
    };

    if changed {
        manager.into_store().save(&db_path).await?;
    } else {
        debug!("Collection unchanged; not saving");
    }
    Ok(())
}

/// Read one project record from a JSON file.
async fn read_record(path: &Path) -> Result<ProjectRecord, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

fn insert_project<S: ProjectStore>(manager: &mut RecordManager<S>, record: ProjectRecord) -> bool {
    match manager.insert(record) {
        Ok(id) => {
            println!("Successfully inserted new project with ID: {}", id);
            true
        }
        Err(e) => {
            println!("Error inserting project: {}", e);
            false
        }
    }
}

fn find_projects<S: ProjectStore>(manager: &RecordManager<S>, category: TechCategory, value: &str) {
    match manager.find_by_technology(category, value) {
        Ok(projects) => print!("{}", console::projects_report(value, &projects)),
        Err(e) => println!("Error querying projects: {}", e),
    }
}

fn show_project<S: ProjectStore>(manager: &RecordManager<S>, name: &str) {
    match manager.find_by_name(name) {
        Ok(Some(project)) => match serde_json::to_string_pretty(&project) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("Error rendering project: {}", e),
        },
        Ok(None) => println!("Project '{}' not found", name),
        Err(e) => println!("Error querying projects: {}", e),
    }
}

fn show_top_languages<S: ProjectStore>(manager: &RecordManager<S>) {
    match manager.top_languages() {
        Ok(rows) => print!("{}", console::top_languages_report(&rows)),
        Err(e) => println!("Error in aggregation: {}", e),
    }
}

fn update_project_metrics<S: ProjectStore>(
    manager: &mut RecordManager<S>,
    name: &str,
    metrics: &Map<String, Value>,
) -> bool {
    match manager.update_metrics(name, metrics) {
        Ok(outcome) => {
            if outcome.modified {
                println!("Successfully updated metrics for '{}'", name);
            } else {
                println!("No changes made to '{}'", name);
            }
            println!("\nUpdated project metrics:");
            println!("{}", console::metrics_report(&outcome.metrics));
            outcome.modified
        }
        Err(e) => {
            println!("Error updating metrics: {}", e);
            false
        }
    }
}

/// The sample walkthrough: insert, two queries, aggregation, one valid and
/// one invalid metrics update.
fn run_demo<S: ProjectStore>(manager: &mut RecordManager<S>) {
    insert_project(manager, sample_project());

    println!();
    find_projects(manager, TechCategory::Frameworks, "scikit-learn");
    println!();
    find_projects(manager, TechCategory::Languages, "Python");

    println!();
    show_top_languages(manager);

    println!();
    let valid = demo_metrics(&[("precision", 0.95), ("recall", 0.88), ("f1_score", 0.91)]);
    update_project_metrics(manager, "Recommendation Engine", &valid);

    // Out of range and missing f1_score: rejected without touching the record.
    println!();
    let invalid = demo_metrics(&[("precision", 1.5), ("recall", 0.88)]);
    update_project_metrics(manager, "Recommendation Engine", &invalid);
}

fn demo_metrics(entries: &[(&str, f64)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(*value)))
        .collect()
}

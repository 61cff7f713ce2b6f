//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and subcommands using the `clap` crate.
//! Flags override values from the optional YAML config file; a few options
//! can also come from environment variables.

use crate::config::{RecordsConfig, ScrapeConfig};
use crate::models::TechCategory;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Command-line arguments for frontpage_records.
///
/// # Examples
///
/// ```sh
/// # Scrape the Hacker News front page into a file
/// frontpage_records scrape -o hacker_news.json
///
/// # Query the project collection
/// frontpage_records projects find --category languages --value Python
///
/// # Replace a project's metrics
/// frontpage_records projects update-metrics --name "Recommendation Engine" \
///     --metrics '{"precision": 0.95, "recall": 0.88, "f1_score": 0.91}'
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true, env = "FRONTPAGE_RECORDS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape listings from a front page and write them as a JSON array
    Scrape(ScrapeArgs),
    /// Insert, query, aggregate and update project records
    Projects(ProjectsArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Output file for the JSON array, or `-` for stdout
    #[arg(short, long)]
    pub output: String,

    /// Page to scrape
    #[arg(long)]
    pub url: Option<String>,

    /// CSS selector matching one anchor per listing
    #[arg(long)]
    pub selector: Option<String>,

    /// Resolve relative links against the page URL
    #[arg(long)]
    pub resolve_links: bool,
}

impl ScrapeArgs {
    /// Overlay flags given on the command line onto `config`.
    pub fn apply(&self, config: &mut ScrapeConfig) {
        if let Some(url) = &self.url {
            config.start_url = url.clone();
        }
        if let Some(selector) = &self.selector {
            config.selector = selector.clone();
        }
        if self.resolve_links {
            config.resolve_links = true;
        }
    }
}

#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// JSON file holding the project collection
    #[arg(long, env = "PROJECTS_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ProjectsAction,
}

impl ProjectsArgs {
    /// Overlay flags given on the command line onto `config`.
    pub fn apply(&self, config: &mut RecordsConfig) {
        if let Some(db) = &self.db {
            config.database = db.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProjectsAction {
    /// Insert a project read from a JSON file
    Insert {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Find projects using a technology
    Find {
        #[arg(long, value_enum)]
        category: TechCategory,
        #[arg(long)]
        value: String,
    },
    /// Show one project by name
    FindName {
        #[arg(long)]
        name: String,
    },
    /// Show the five most common programming languages
    TopLanguages,
    /// Replace a project's metrics
    UpdateMetrics {
        #[arg(long)]
        name: String,
        /// JSON object with precision, recall and f1_score
        #[arg(long, value_parser = parse_metrics)]
        metrics: Map<String, Value>,
    },
    /// Run the sample insert/query/aggregate/update walkthrough
    Demo,
}

/// Parse a JSON object argument. Values are validated later by the record manager.
fn parse_metrics(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", other)),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

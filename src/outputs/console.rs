//! Human-readable reports for record manager results.
//!
//! These render to `String` so the command layer decides where they go.

use crate::models::{LanguageUsage, Metrics, StoredProject};
use itertools::Itertools;
use std::fmt::Write;

/// Render the projects matching a technology filter.
pub fn projects_report(value: &str, projects: &[StoredProject]) -> String {
    let mut out = String::new();
    writeln!(out, "Projects using {}:", value).unwrap();
    if projects.is_empty() {
        writeln!(out, "  (none)").unwrap();
    }
    for project in projects {
        let record = &project.record;
        writeln!(out, "- {}", record.name).unwrap();
        writeln!(out, "  Team: {}", record.team.iter().join(", ")).unwrap();
        writeln!(out, "  Status: {}", record.status).unwrap();
    }
    out
}

/// Render the top-languages aggregation.
pub fn top_languages_report(rows: &[LanguageUsage]) -> String {
    let mut out = String::new();
    writeln!(out, "Most common programming languages:").unwrap();
    for row in rows {
        writeln!(out).unwrap();
        writeln!(out, "{}:", row.language).unwrap();
        writeln!(out, "Used in {} projects:", row.count).unwrap();
        for project in &row.projects {
            writeln!(out, "- {}", project).unwrap();
        }
    }
    out
}

/// Render a metrics sub-object, one metric per line.
pub fn metrics_report(metrics: &Metrics) -> String {
    metrics
        .entries()
        .iter()
        .map(|(key, value)| format!("  {}: {}", key, value))
        .join("\n")
}

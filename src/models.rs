//! Data models for scraped listings and project records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Listing`]: A `(title, link)` pair scraped from a front page
//! - [`ProjectRecord`]: A software project document stored in the collection
//! - [`StoredProject`]: A project record together with its generated [`RecordId`]
//! - [`LanguageUsage`]: One row of the top-languages aggregation
//! - [`UpdateOutcome`]: Result of an accepted metrics update
//!
//! Record field names match the document layout in the collection, so the
//! JSON produced here can be loaded back without any mapping.

use chrono::Utc;
use clap::ValueEnum;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// A single entry scraped from a front page.
///
/// Both fields are optional because the page markup does not guarantee them:
/// an anchor may carry no text node or no `href`. Absent values serialize as
/// `null` so every element of the output array has the same two keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Listing {
    /// The anchor's first text node.
    pub title: Option<String>,
    /// The anchor's `href`, as written in the page unless resolved.
    pub link: Option<String>,
}

/// A software project document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectRecord {
    /// Unique key of the collection.
    pub name: String,
    /// Team members, in the order they were given.
    pub team: Vec<String>,
    pub technologies: Technologies,
    pub metrics: Metrics,
    pub status: ProjectStatus,
}

/// Technology stack of a project, split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Technologies {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub databases: Vec<String>,
}

impl Technologies {
    /// The list belonging to `category`.
    pub fn in_category(&self, category: TechCategory) -> &[String] {
        match category {
            TechCategory::Languages => &self.languages,
            TechCategory::Frameworks => &self.frameworks,
            TechCategory::Databases => &self.databases,
        }
    }
}

/// Quality metrics of a project. Each value lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl Metrics {
    /// Metric keys every update must carry, in validation order.
    pub const REQUIRED: [&'static str; 3] = ["precision", "recall", "f1_score"];

    /// Pairs of `(key, value)` in the same order as [`Metrics::REQUIRED`].
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
        ]
    }
}

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    OnHold,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        };
        f.write_str(s)
    }
}

/// Technology category a project can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TechCategory {
    Languages,
    Frameworks,
    Databases,
}

impl fmt::Display for TechCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TechCategory::Languages => "languages",
            TechCategory::Frameworks => "frameworks",
            TechCategory::Databases => "databases",
        };
        f.write_str(s)
    }
}

/// Process-wide counter for the last three bytes of a [`RecordId`].
static ID_COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::rng().random::<u32>()));

/// Identifier generated for every inserted record.
///
/// Twelve bytes rendered as 24 lowercase hex digits: a big-endian unix
/// timestamp in seconds, five random bytes, then a 24-bit counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now().timestamp())
    }

    fn generate_at(unix_secs: i64) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp_prefix(unix_secs).to_be_bytes());
        let random: [u8; 5] = rand::rng().random();
        bytes[4..9].copy_from_slice(&random);
        let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

        RecordId(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Seconds for the four-byte timestamp field.
///
/// Clamped rather than wrapped: clocks before the epoch give `0` and
/// anything past 2106-02-07 saturates at `u32::MAX`, so the prefix never
/// jumps back to an earlier time.
fn timestamp_prefix(unix_secs: i64) -> u32 {
    u32::try_from(unix_secs).unwrap_or(if unix_secs < 0 { 0 } else { u32::MAX })
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project record as held by the collection, with its identifier.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoredProject {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub record: ProjectRecord,
}

/// One row of the top-languages aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguageUsage {
    /// The language this row groups by.
    #[serde(rename = "_id")]
    pub language: String,
    /// Number of `(project, language)` rows that fell into the group.
    pub count: usize,
    /// Names of the projects that contributed, in collection order.
    pub projects: Vec<String>,
}

/// Result of an accepted metrics update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateOutcome {
    /// Whether any stored value actually changed.
    pub modified: bool,
    /// The metrics now stored for the project.
    pub metrics: Metrics,
}

/// The project inserted by `projects demo`.
pub fn sample_project() -> ProjectRecord {
    ProjectRecord {
        name: "Recommendation Engine".to_string(),
        team: ["Sarah", "Michael", "Emma", "David"]
            .into_iter()
            .map(String::from)
            .collect(),
        technologies: Technologies {
            languages: vec!["Python".to_string(), "Scala".to_string()],
            frameworks: vec![
                "PySpark".to_string(),
                "scikit-learn".to_string(),
                "FastAPI".to_string(),
            ],
            databases: vec!["MongoDB".to_string(), "Redis".to_string()],
        },
        metrics: Metrics {
            precision: 0.89,
            recall: 0.92,
            f1_score: 0.90,
        },
        status: ProjectStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_serializes_missing_fields_as_null() {
        let listing = Listing {
            title: Some("Show HN: a thing".to_string()),
            link: None,
        };

        let json = serde_json::to_string(&listing).unwrap();
        assert_eq!(json, r#"{"title":"Show HN: a thing","link":null}"#);
    }

    #[test]
    fn test_project_record_deserialization() {
        let json = r#"{
            "name": "Search",
            "team": ["Ana"],
            "technologies": {"languages": ["Rust"], "frameworks": [], "databases": ["Postgres"]},
            "metrics": {"precision": 0.5, "recall": 0.6, "f1_score": 0.55},
            "status": "in_progress"
        }"#;

        let record: ProjectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Search");
        assert_eq!(record.status, ProjectStatus::InProgress);
        assert_eq!(record.technologies.languages, vec!["Rust"]);
        assert_eq!(record.metrics.recall, 0.6);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{
            "name": "Search",
            "team": [],
            "technologies": {},
            "metrics": {"precision": 0.5, "recall": 0.6, "f1_score": 0.55},
            "status": "abandoned"
        }"#;

        assert!(serde_json::from_str::<ProjectRecord>(json).is_err());
    }

    #[test]
    fn test_stored_project_flattens_record() {
        let stored = StoredProject {
            id: RecordId("00000000000000000000abcd".to_string()),
            record: sample_project(),
        };

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["_id"], "00000000000000000000abcd");
        assert_eq!(value["name"], "Recommendation Engine");
        assert_eq!(value["technologies"]["languages"][1], "Scala");
    }

    #[test]
    fn test_record_id_shape() {
        let id = RecordId::generate();
        assert_eq!(id.as_str().len(), 24);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_timestamp_prefix_saturates_instead_of_wrapping() {
        assert_eq!(timestamp_prefix(1_700_000_000), 1_700_000_000);
        assert_eq!(timestamp_prefix(u32::MAX as i64), u32::MAX);
        // 2106-02-07T06:28:16Z would wrap to 0 with a plain cast.
        assert_eq!(timestamp_prefix(u32::MAX as i64 + 1), u32::MAX);
        assert_eq!(timestamp_prefix(i64::MAX), u32::MAX);
        assert_eq!(timestamp_prefix(-1), 0);
    }

    #[test]
    fn test_record_id_timestamp_bytes_past_2106() {
        let id = RecordId::generate_at(u32::MAX as i64 + 1);
        assert!(id.as_str().starts_with("ffffffff"));
        assert_eq!(id.as_str().len(), 24);

        let id = RecordId::generate_at(0x6500_0000);
        assert!(id.as_str().starts_with("65000000"));
    }

    #[test]
    fn test_record_ids_are_distinct() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_technologies_in_category() {
        let tech = sample_project().technologies;
        assert_eq!(tech.in_category(TechCategory::Databases), ["MongoDB", "Redis"]);
        assert!(tech.in_category(TechCategory::Frameworks).contains(&"FastAPI".to_string()));
    }

    #[test]
    fn test_status_display_matches_serde() {
        let json = serde_json::to_string(&ProjectStatus::OnHold).unwrap();
        assert_eq!(json, format!("\"{}\"", ProjectStatus::OnHold));
    }
}

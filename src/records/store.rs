//! Project collection abstraction and its in-memory implementation.
//!
//! The record manager only talks to a [`ProjectStore`]. [`MemoryStore`] keeps
//! documents in a `Vec` and can be loaded from and saved to a JSON file, one
//! array of documents with their `_id`s.

use crate::error::StoreError;
use crate::models::{LanguageUsage, Metrics, ProjectRecord, RecordId, StoredProject, TechCategory};
use crate::records::pipeline;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Which documents an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    /// Every document.
    All,
    /// The document whose `name` equals the given value.
    Name(String),
    /// Documents whose technology list in `category` contains `value` exactly.
    Technology { category: TechCategory, value: String },
}

impl ProjectFilter {
    pub fn matches(&self, project: &StoredProject) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Name(name) => project.record.name == *name,
            ProjectFilter::Technology { category, value } => project
                .record
                .technologies
                .in_category(*category)
                .iter()
                .any(|item| item == value),
        }
    }
}

/// Counts reported by an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matched by the filter.
    pub matched: usize,
    /// Documents whose stored values changed.
    pub modified: usize,
}

/// A collection of project documents.
pub trait ProjectStore {
    /// Insert a record and return its generated identifier.
    fn insert_one(&mut self, record: ProjectRecord) -> Result<RecordId, StoreError>;

    /// All documents matching `filter`, in insertion order.
    fn find(&self, filter: &ProjectFilter) -> Result<Vec<StoredProject>, StoreError>;

    /// First document matching `filter`.
    fn find_one(&self, filter: &ProjectFilter) -> Result<Option<StoredProject>, StoreError> {
        Ok(self.find(filter)?.into_iter().next())
    }

    /// Replace the metrics sub-object of the first document matching `filter`.
    fn set_metrics(
        &mut self,
        filter: &ProjectFilter,
        metrics: Metrics,
    ) -> Result<UpdateResult, StoreError>;

    /// Run the top-languages pipeline, keeping at most `limit` rows.
    ///
    /// Stores that can aggregate on their side override this.
    fn aggregate_languages(&self, limit: usize) -> Result<Vec<LanguageUsage>, StoreError> {
        let projects = self.find(&ProjectFilter::All)?;
        Ok(pipeline::top_languages(&projects, limit))
    }
}

/// In-memory project collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<StoredProject>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing documents, rejecting duplicate names.
    pub fn from_documents(documents: Vec<StoredProject>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for document in documents {
            if store.contains_name(&document.record.name) {
                return Err(StoreError::DuplicateKey(document.record.name));
            }
            store.documents.push(document);
        }
        Ok(store)
    }

    pub fn documents(&self) -> &[StoredProject] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn contains_name(&self, name: &str) -> bool {
        self.documents.iter().any(|d| d.record.name == name)
    }

    /// Load a collection file. A missing file is an empty collection.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        if !fs::try_exists(path).await? {
            info!("Collection file does not exist yet; starting empty");
            return Ok(Self::new());
        }

        let raw = fs::read_to_string(path).await?;
        let documents: Vec<StoredProject> = if raw.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&raw)?
        };
        let store = Self::from_documents(documents)?;
        info!(count = store.len(), "Loaded collection");
        Ok(store)
    }

    /// Write the collection to `path`, creating the parent directory if needed.
    ///
    /// The JSON goes to a sibling temp file that is then renamed over `path`,
    /// so a failed save leaves the previous collection intact.
    #[instrument(level = "info", skip_all, fields(path = %path.display(), count = self.len()))]
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(self.documents())?;

        // Atomic write: write to temp file, then rename
        let temp_path = temp_path_for(path);
        if let Err(e) = fs::write(&temp_path, &json).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        fs::rename(&temp_path, path).await?;
        info!(bytes = json.len(), "Saved collection");
        Ok(())
    }
}

/// Sibling temp file used while saving `path`, e.g. `.projects.json.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collection.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

impl ProjectStore for MemoryStore {
    fn insert_one(&mut self, record: ProjectRecord) -> Result<RecordId, StoreError> {
        if self.contains_name(&record.name) {
            return Err(StoreError::DuplicateKey(record.name));
        }
        let id = RecordId::generate();
        debug!(%id, name = %record.name, "Inserting document");
        self.documents.push(StoredProject {
            id: id.clone(),
            record,
        });
        Ok(id)
    }

    fn find(&self, filter: &ProjectFilter) -> Result<Vec<StoredProject>, StoreError> {
        Ok(self
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    fn set_metrics(
        &mut self,
        filter: &ProjectFilter,
        metrics: Metrics,
    ) -> Result<UpdateResult, StoreError> {
        let Some(document) = self.documents.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(UpdateResult::default());
        };

        let modified = if document.record.metrics == metrics {
            0
        } else {
            document.record.metrics = metrics;
            1
        };
        Ok(UpdateResult {
            matched: 1,
            modified,
        })
    }
}

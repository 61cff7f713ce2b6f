//! Project record operations.
//!
//! [`RecordManager`] runs four independent operations against a
//! [`ProjectStore`]: insert, find-by-technology, the top-languages
//! aggregation and a validated metrics update. Every operation goes through
//! [`guarded`], so failures come back as `Err(RecordError)` with a logged
//! message and never as a panic.
//!
//! There is no state between calls beyond what the store holds.

pub mod pipeline;
pub mod store;

use crate::error::RecordError;
use crate::models::{
    LanguageUsage, Metrics, ProjectRecord, RecordId, StoredProject, TechCategory, UpdateOutcome,
};
use pipeline::TOP_LANGUAGES_LIMIT;
use serde_json::{Map, Value};
use store::{ProjectFilter, ProjectStore};
use tracing::{debug, error, info, instrument};

/// Run `op`, logging any error under `operation` before returning it.
pub fn guarded<T, F>(operation: &str, op: F) -> Result<T, RecordError>
where
    F: FnOnce() -> Result<T, RecordError>,
{
    let result = op();
    if let Err(e) = &result {
        error!(operation, error = %e, "Error {}: {}", operation, e);
    }
    result
}

/// Check an untyped metrics map and convert it to [`Metrics`].
///
/// Order of checks: every required key must be present, then each value must
/// be a number in `[0, 1]`. Keys beyond the required three are ignored.
pub fn validate_metrics(raw: &Map<String, Value>) -> Result<Metrics, RecordError> {
    if let Some(missing) = Metrics::REQUIRED.iter().find(|key| !raw.contains_key(**key)) {
        return Err(RecordError::MissingMetric(missing.to_string()));
    }

    let mut values = [0.0f64; 3];
    for (slot, key) in values.iter_mut().zip(Metrics::REQUIRED) {
        let value = &raw[key];
        *slot = value
            .as_f64()
            .filter(|v| (0.0..=1.0).contains(v))
            .ok_or_else(|| RecordError::OutOfRange {
                metric: key.to_string(),
                value: value.to_string(),
            })?;
    }

    let extra: Vec<&String> = raw
        .keys()
        .filter(|k| !Metrics::REQUIRED.iter().any(|required| *required == k.as_str()))
        .collect();
    if !extra.is_empty() {
        debug!(?extra, "Ignoring unknown metric keys");
    }

    let [precision, recall, f1_score] = values;
    Ok(Metrics {
        precision,
        recall,
        f1_score,
    })
}

/// Check the metrics of a fully-formed record.
fn check_record_metrics(metrics: &Metrics) -> Result<(), RecordError> {
    for (key, value) in metrics.entries() {
        if !(0.0..=1.0).contains(&value) {
            return Err(RecordError::OutOfRange {
                metric: key.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Record operations over a project collection.
#[derive(Debug)]
pub struct RecordManager<S> {
    store: S,
}

impl<S: ProjectStore> RecordManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Insert a project and return its generated identifier.
    ///
    /// Not idempotent: a second insert of the same name is rejected by the store.
    #[instrument(level = "info", skip_all, fields(name = %record.name))]
    pub fn insert(&mut self, record: ProjectRecord) -> Result<RecordId, RecordError> {
        guarded("inserting project", || {
            check_record_metrics(&record.metrics)?;
            let id = self.store.insert_one(record)?;
            info!(%id, "Inserted project");
            Ok(id)
        })
    }

    /// All projects whose `category` list contains `value` exactly.
    #[instrument(level = "info", skip(self))]
    pub fn find_by_technology(
        &self,
        category: TechCategory,
        value: &str,
    ) -> Result<Vec<StoredProject>, RecordError> {
        guarded("querying projects", || {
            let filter = ProjectFilter::Technology {
                category,
                value: value.to_string(),
            };
            let found = self.store.find(&filter)?;
            info!(count = found.len(), "Found projects");
            Ok(found)
        })
    }

    /// The project named `name`, if any.
    #[instrument(level = "info", skip(self))]
    pub fn find_by_name(&self, name: &str) -> Result<Option<StoredProject>, RecordError> {
        guarded("querying projects", || {
            Ok(self.store.find_one(&ProjectFilter::Name(name.to_string()))?)
        })
    }

    /// The most used languages, at most five rows, by descending count.
    #[instrument(level = "info", skip(self))]
    pub fn top_languages(&self) -> Result<Vec<LanguageUsage>, RecordError> {
        guarded("in aggregation", || {
            let rows = self.store.aggregate_languages(TOP_LANGUAGES_LIMIT)?;
            info!(rows = rows.len(), "Aggregated languages");
            Ok(rows)
        })
    }

    /// Replace the metrics of the project named `name`.
    ///
    /// Nothing is written unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NotFound`] when no project has that name
    /// - [`RecordError::MissingMetric`] when a required key is absent
    /// - [`RecordError::OutOfRange`] when a value is not a number in `[0, 1]`
    #[instrument(level = "info", skip(self, new_metrics))]
    pub fn update_metrics(
        &mut self,
        name: &str,
        new_metrics: &Map<String, Value>,
    ) -> Result<UpdateOutcome, RecordError> {
        guarded("updating metrics", || {
            let filter = ProjectFilter::Name(name.to_string());
            if self.store.find_one(&filter)?.is_none() {
                return Err(RecordError::NotFound(name.to_string()));
            }

            let metrics = validate_metrics(new_metrics)?;
            let result = self.store.set_metrics(&filter, metrics)?;
            if result.matched == 0 {
                return Err(RecordError::NotFound(name.to_string()));
            }

            let modified = result.modified > 0;
            if modified {
                info!("Successfully updated metrics");
            } else {
                info!("No changes made");
            }
            Ok(UpdateOutcome { modified, metrics })
        })
    }
}

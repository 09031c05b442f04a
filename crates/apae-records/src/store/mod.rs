//! File-backed collection store.
//!
//! Each [`CollectionStore`] owns one JSON-array file and one [`Schema`]. Every
//! operation reloads the file; mutating operations write the whole array back
//! before returning.

pub mod file;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Fields, Record};
use crate::schema::Schema;

/// How new record ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// `len + 1`. Compatible with existing data files, but repeats an id
    /// after a deletion followed by an insertion.
    #[default]
    Count,
    /// One more than the largest numeric id. Non-numeric ids are ignored.
    MaxPlusOne,
}

impl IdPolicy {
    /// Compute the id for a record appended to `records`.
    #[must_use]
    pub fn next_id(self, records: &[Record]) -> String {
        match self {
            Self::Count => (records.len() + 1).to_string(),
            Self::MaxPlusOne => {
                let max = records
                    .iter()
                    .filter_map(Record::id)
                    .filter_map(|id| id.parse::<u64>().ok())
                    .max()
                    .unwrap_or(0);
                max.saturating_add(1).to_string()
            }
        }
    }
}

impl std::fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::MaxPlusOne => write!(f, "max_plus_one"),
        }
    }
}

/// Whether mutating operations on one store are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Read-modify-write sequences on the same store run one at a time.
    #[default]
    Serialized,
    /// No locking. Concurrent mutations can overwrite each other.
    Unsynchronized,
}

impl std::fmt::Display for ConcurrencyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialized => write!(f, "serialized"),
            Self::Unsynchronized => write!(f, "unsynchronized"),
        }
    }
}

/// The operations a resource collection offers to its callers.
#[async_trait]
pub trait RecordCollection: Send + Sync + std::fmt::Debug {
    /// The schema records in this collection follow.
    fn schema(&self) -> &'static Schema;

    /// Return every record in file order.
    async fn list(&self) -> Result<Vec<Record>>;

    /// Return the first record with the given id.
    async fn get(&self, id: &str) -> Result<Record>;

    /// Append a new record built from `fields` and return it.
    async fn create(&self, fields: &Fields) -> Result<Record>;

    /// Update the record with the given id and return the new version.
    async fn update(&self, id: &str, fields: &Fields) -> Result<Record>;

    /// Remove the record with the given id.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Number of records currently stored.
    async fn count(&self) -> Result<usize>;

    /// Create the backing file as an empty array if it does not exist.
    /// Returns `true` if it was created.
    async fn ensure_exists(&self) -> Result<bool>;
}

/// A collection persisted as one pretty-printed JSON array.
#[derive(Debug)]
pub struct CollectionStore {
    schema: &'static Schema,
    path: PathBuf,
    id_policy: IdPolicy,
    write_lock: Option<Mutex<()>>,
}

impl CollectionStore {
    /// Create a store for `schema` backed by the file at `path`.
    ///
    /// Uses the default id and concurrency policies.
    #[must_use]
    pub fn new(schema: &'static Schema, path: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            path: path.into(),
            id_policy: IdPolicy::default(),
            write_lock: Some(Mutex::new(())),
        }
    }

    /// Set the id policy.
    #[must_use]
    pub fn with_id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    /// Set the concurrency policy.
    #[must_use]
    pub fn with_concurrency(mut self, policy: ConcurrencyPolicy) -> Self {
        self.write_lock = match policy {
            ConcurrencyPolicy::Serialized => Some(Mutex::new(())),
            ConcurrencyPolicy::Unsynchronized => None,
        };
        self
    }

    /// Path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The id policy in use.
    #[must_use]
    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    /// The concurrency policy in use.
    #[must_use]
    pub fn concurrency(&self) -> ConcurrencyPolicy {
        if self.write_lock.is_some() {
            ConcurrencyPolicy::Serialized
        } else {
            ConcurrencyPolicy::Unsynchronized
        }
    }

    async fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    async fn load(&self) -> Result<Vec<Record>> {
        file::read_collection(&self.path).await
    }

    async fn save(&self, records: &[Record]) -> Result<()> {
        file::write_collection(&self.path, records).await
    }

    fn position(&self, records: &[Record], id: &str) -> Result<usize> {
        records
            .iter()
            .position(|record| record.has_id(id))
            .ok_or_else(|| Error::not_found(self.schema.name, id))
    }
}

#[async_trait]
impl RecordCollection for CollectionStore {
    fn schema(&self) -> &'static Schema {
        self.schema
    }

    async fn list(&self) -> Result<Vec<Record>> {
        let records = self.load().await?;
        debug!(
            collection = self.schema.name,
            count = records.len(),
            "Listed records"
        );
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Record> {
        let mut records = self.load().await?;
        let index = self.position(&records, id)?;
        Ok(records.swap_remove(index))
    }

    async fn create(&self, fields: &Fields) -> Result<Record> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;

        let id = self.id_policy.next_id(&records);
        let record = self.schema.build_new(id, fields);
        records.push(record.clone());
        self.save(&records).await?;

        debug!(
            collection = self.schema.name,
            id = record.id().unwrap_or_default(),
            "Created record"
        );
        Ok(record)
    }

    async fn update(&self, id: &str, fields: &Fields) -> Result<Record> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;

        let index = self.position(&records, id)?;
        let updated = self.schema.apply_update(&records[index], id, fields);
        records[index] = updated.clone();
        self.save(&records).await?;

        debug!(collection = self.schema.name, id, mode = %self.schema.mode, "Updated record");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;

        let index = self.position(&records, id)?;
        records.remove(index);
        self.save(&records).await?;

        debug!(collection = self.schema.name, id, "Deleted record");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    async fn ensure_exists(&self) -> Result<bool> {
        let _guard = self.lock().await;
        let created = file::ensure_collection(&self.path).await?;
        if created {
            info!(
                collection = self.schema.name,
                "Created empty collection file at {}",
                self.path.display()
            );
        }
        Ok(created)
    }
}

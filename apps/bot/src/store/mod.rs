//! Resume Store: user identity → résumé text.
//!
//! Persistence sits behind `load`/`save`. Handlers only ever call `get` and
//! `upsert`, so another backend needs to implement the two primitives and
//! nothing else changes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

mod json_file;

pub use json_file::JsonFileStore;

/// Full stored mapping. Ordered so the persisted file is deterministic.
pub type Resumes = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed resume file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize resumes: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
///
/// Every lookup reads the whole mapping and every write rewrites it. There is
/// no locking: two concurrent `upsert`s race and the last `save` wins.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Reads the full mapping. Absent storage is an empty mapping, not an error.
    async fn load(&self) -> Result<Resumes, StoreError>;

    /// Overwrites storage with the full mapping.
    async fn save(&self, resumes: &Resumes) -> Result<(), StoreError>;

    /// Inserts or replaces the résumé for `user_id`.
    async fn upsert(&self, user_id: &str, text: &str) -> Result<(), StoreError> {
        let mut resumes = self.load().await?;
        resumes.insert(user_id.to_string(), text.to_string());
        self.save(&resumes).await
    }

    async fn get(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.remove(user_id))
    }
}

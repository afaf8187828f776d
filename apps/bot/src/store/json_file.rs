use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use super::{ResumeStore, Resumes, StoreError};

/// Resume store backed by a single pretty-printed JSON object on disk.
///
/// Writes are plain overwrites (no temp file + rename), so a crash mid-write
/// can leave a truncated file behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty file (and its parent directory) if nothing exists yet.
    /// Lets a bad path fail at startup rather than on the first `/setup`.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        info!("Resume store ready at {}", self.path().display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ResumeStore for JsonFileStore {
    async fn load(&self) -> Result<Resumes, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, treating as empty", self.path.display());
                return Ok(Resumes::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(Resumes::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, resumes: &Resumes) -> Result<(), StoreError> {
        let body = to_pretty_json(resumes)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| self.io_error(source))
    }
}

/// Serializes with 4-space indentation so the file stays hand-editable.
fn to_pretty_json(resumes: &Resumes) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    resumes
        .serialize(&mut serializer)
        .map_err(StoreError::Serialize)?;
    Ok(buf)
}

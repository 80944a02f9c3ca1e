//! JSON files in a single data directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::StorageError;

/// Reads and writes pretty-printed JSON files under `directory`.
#[derive(Debug, Clone)]
pub struct FileHandler {
    directory: PathBuf,
}

impl FileHandler {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }

    /// Load and deserialize `filename`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>, StorageError> {
        let path = self.path(filename);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(&path, source)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Json {
                path: path.display().to_string(),
                source,
            })
    }

    /// Serialize `data` to `filename`, creating the directory if needed.
    pub fn save<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.directory).map_err(|source| io_error(&self.directory, source))?;
        let path = self.path(filename);
        let content = serde_json::to_string_pretty(data).map_err(|source| StorageError::Json {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| io_error(&path, source))
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).exists()
    }
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new(".")
    }
}

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

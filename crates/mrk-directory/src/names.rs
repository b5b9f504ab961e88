//! In-memory name directory with JSON loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Directory;

/// Error returned when a directory export cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// I/O error reading the export file.
    #[error("Failed to read directory {}: {source}", path.display())]
    Io {
        /// Path of the export file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The export is not valid JSON or has the wrong shape.
    #[error("Invalid directory JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Directory export as stored on disk.
///
/// ```json
/// {
///   "users": { "U024BE7LH": "alice" },
///   "channels": { "C024BE91L": "general" },
///   "usergroups": { "SAZ94GDB8": "oncall" }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DirectoryFile {
    users: HashMap<String, String>,
    channels: HashMap<String, String>,
    usergroups: HashMap<String, String>,
}

/// [`Directory`] backed by three hash maps.
///
/// Build it with the `with_*` methods or load it from a JSON export with
/// [`NameDirectory::load`].
#[derive(Debug, Default, Clone)]
pub struct NameDirectory {
    users: HashMap<String, String>,
    channels: HashMap<String, String>,
    usergroups: HashMap<String, String>,
}

impl NameDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user name.
    #[must_use]
    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.users.insert(id.into(), name.into());
        self
    }

    /// Add a channel name.
    #[must_use]
    pub fn with_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.channels.insert(id.into(), name.into());
        self
    }

    /// Add a user group handle.
    #[must_use]
    pub fn with_usergroup(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.usergroups.insert(id.into(), name.into());
        self
    }

    /// Parse a directory from its JSON representation.
    ///
    /// Every section is optional; missing sections are empty.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let file: DirectoryFile = serde_json::from_str(json)?;
        Ok(Self {
            users: file.users,
            channels: file.channels,
            usergroups: file.usergroups,
        })
    }

    /// Load a directory from a JSON export file.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json(&content)?;

        tracing::info!(
            path = %path.display(),
            users = directory.users.len(),
            channels = directory.channels.len(),
            usergroups = directory.usergroups.len(),
            "Loaded name directory"
        );

        Ok(directory)
    }

    /// Total number of names across all sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len() + self.channels.len() + self.usergroups.len()
    }

    /// Check if the directory holds no names at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Directory for NameDirectory {
    fn user_name(&self, id: &str) -> Option<&str> {
        self.users.get(id).map(String::as_str)
    }

    fn channel_name(&self, id: &str) -> Option<&str> {
        self.channels.get(id).map(String::as_str)
    }

    fn usergroup_name(&self, id: &str) -> Option<&str> {
        self.usergroups.get(id).map(String::as_str)
    }
}

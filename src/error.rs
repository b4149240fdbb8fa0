//! Error types for configuration resolution and loading.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`] for programmatic handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A location (project directory, home directory, ...) could not be found.
    NotFound,
    /// A manifest or config file was missing, unreadable or malformed.
    InvalidInput,
}

/// Underlying cause of a manifest read failure.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while building a configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `package.json` was found walking upward from the entry directory.
    #[error("Project directory could not be found automatically (searched upward from {})", .start.display())]
    ProjectDirNotFound { start: PathBuf },

    /// The directory of the running executable is unavailable.
    #[error("Project directory could not be found automatically, entry point location is unknown")]
    EntryDirUnknown,

    #[error("Home directory could not be determined")]
    HomeDirUnknown,

    #[error("Working directory could not be determined")]
    WorkingDirUnknown {
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be read or is not valid JSON.
    #[error("App name could not be found automatically, {} could not be read", .path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    /// The manifest parsed but has no usable `name`.
    #[error("App name could not be found automatically, was not set in {}", .path.display())]
    AppNameMissing { path: PathBuf },

    #[error("App name cannot be resolved before the project directory is set")]
    ProjectDirUnset,

    /// A config file could not be read and a missing file was not allowed.
    #[error("Could not read config file {}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in config file {}", .path.display())]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed, but holds a value a config map cannot represent.
    #[error("Unsupported value in config file {}: {detail}", .path.display())]
    UnsupportedValue { path: PathBuf, detail: String },

    /// The document parsed, but its top level is a scalar or sequence.
    #[error("Config file {} must contain a mapping at the top level", .path.display())]
    NotAMapping { path: PathBuf },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProjectDirNotFound { .. }
            | Error::EntryDirUnknown
            | Error::HomeDirUnknown
            | Error::WorkingDirUnknown { .. } => ErrorKind::NotFound,
            Error::ManifestUnreadable { .. }
            | Error::AppNameMissing { .. }
            | Error::ProjectDirUnset
            | Error::ConfigUnreadable { .. }
            | Error::InvalidYaml { .. }
            | Error::UnsupportedValue { .. }
            | Error::NotAMapping { .. } => ErrorKind::InvalidInput,
        }
    }

    /// The file or directory this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::ProjectDirNotFound { start } => Some(start.as_path()),
            Error::ManifestUnreadable { path, .. }
            | Error::AppNameMissing { path }
            | Error::ConfigUnreadable { path, .. }
            | Error::InvalidYaml { path, .. }
            | Error::UnsupportedValue { path, .. }
            | Error::NotAMapping { path } => Some(path.as_path()),
            Error::EntryDirUnknown
            | Error::HomeDirUnknown
            | Error::WorkingDirUnknown { .. }
            | Error::ProjectDirUnset => None,
        }
    }
}

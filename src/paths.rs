//! System locations and lexical path resolution.
//!
//! Configuration lookup depends on three locations owned by the host process:
//! - the entry directory (where the running executable lives), used as the
//!   starting point of the upward project search
//! - the user's home directory, where per-user config files live
//! - the working directory, against which relative paths are resolved
//!
//! `SystemPaths::discover()` reads them from the OS; `SystemPaths::with_dirs()`
//! pins them explicitly. Path resolution here is pure string manipulation and
//! never touches the filesystem.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Process-level locations used to resolve configuration paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemPaths {
    /// Directory containing the running program's entry point
    pub entry_dir: Option<PathBuf>,
    /// The user's home directory
    pub home_dir: Option<PathBuf>,
    /// Working directory for resolving relative paths
    pub working_dir: Option<PathBuf>,
}

impl SystemPaths {
    /// Discover locations from the running process.
    ///
    /// Any location the OS cannot report is left as `None` and only fails
    /// when an operation actually needs it.
    pub fn discover() -> Self {
        let entry_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Self {
            entry_dir,
            home_dir: dirs::home_dir(),
            working_dir: std::env::current_dir().ok(),
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(
        entry_dir: Option<PathBuf>,
        home_dir: Option<PathBuf>,
        working_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            entry_dir,
            home_dir,
            working_dir,
        }
    }

    /// Get the home directory or fail with `HomeDirUnknown`.
    pub fn home_dir(&self) -> Result<&Path> {
        self.home_dir.as_deref().ok_or(Error::HomeDirUnknown)
    }

    /// Get the working directory, asking the OS when none was pinned.
    pub fn working_dir(&self) -> Result<PathBuf> {
        match self.working_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|source| Error::WorkingDirUnknown { source }),
        }
    }

    /// Resolve `path` against the working directory.
    ///
    /// Absolute paths are only normalized; the working directory is not
    /// consulted for them.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            return Ok(normalize_path_components(path));
        }
        Ok(resolve_path(&self.working_dir()?, path))
    }
}

/// Resolve `path` against `base`, removing `.` and `..` lexically.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path_components(path)
    } else {
        normalize_path_components(&base.join(path))
    }
}

/// Normalize path components without touching the filesystem.
///
/// A `..` directly below the root is dropped, as `/..` is `/`.
fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => components.push(component),
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                // Relative path climbing above its start; keep it.
                _ => components.push(component),
            },
            Component::Normal(_) => components.push(component),
        }
    }

    components.iter().collect()
}

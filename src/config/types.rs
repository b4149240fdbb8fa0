//! Configuration request types.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A parsed config document or merged configuration.
pub type ConfigMap = Map<String, Value>;

/// File name of the project manifest that marks the project directory.
pub const MANIFEST_FILE: &str = "package.json";

/// File name of the project-level defaults, relative to the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "default.conf.yml";

/// Suffix appended to the app name to form the per-user config file name.
pub const USER_CONFIG_SUFFIX: &str = ".conf.yml";

/// Options for building a configuration.
///
/// Every field is optional. Unset `project_dir` and `app_name` are filled in
/// by the [`Resolver`](super::Resolver); an empty string or empty path counts
/// as unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// Name of the application; defaults to `name` from the project manifest
    pub app_name: Option<String>,
    /// Directory holding the project manifest and `default.conf.yml`
    pub project_dir: Option<PathBuf>,
    /// Explicit user config file. When set, the file must exist.
    pub path: Option<PathBuf>,
    /// Values that take precedence over every config file
    pub overrides: Option<ConfigMap>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(project_dir.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigMap) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// The app name, if set and non-empty.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref().filter(|name| !name.is_empty())
    }

    /// The project directory, if set and non-empty.
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// The explicit user config path, if set and non-empty.
    pub fn path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Options with `app_name` and `project_dir` guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub app_name: String,
    pub project_dir: PathBuf,
    pub path: Option<PathBuf>,
    pub overrides: Option<ConfigMap>,
}

impl ResolvedOptions {
    /// Convert options whose defaults have been filled in.
    ///
    /// Returns `None` if either `app_name` or `project_dir` is still unset.
    pub fn from_options(options: Options) -> Option<Self> {
        let app_name = options.app_name()?.to_string();
        let project_dir = options.project_dir()?.to_path_buf();
        let path = options.path().map(Path::to_path_buf);

        Some(Self {
            app_name,
            project_dir,
            path,
            overrides: options.overrides,
        })
    }

    /// File name of the per-user config, e.g. `myapp.conf.yml`.
    pub fn user_config_file_name(&self) -> String {
        format!("{}{}", self.app_name, USER_CONFIG_SUFFIX)
    }
}

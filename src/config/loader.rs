//! Configuration builder with layer-based merging.
//!
//! Reads the user config file and the project defaults file, then merges
//! them under the caller's overrides.

use super::merge::merge_layers;
use super::resolver::Resolver;
use super::types::{ConfigMap, DEFAULT_CONFIG_FILE, Options, ResolvedOptions};
use crate::error::{Error, Result};
use crate::paths::SystemPaths;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration layer, in order of precedence (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Caller-supplied overrides (highest priority)
    Overrides = 0,
    /// User config file (`~/<app>.conf.yml` or an explicit path)
    User = 1,
    /// Project defaults (`<project>/default.conf.yml`, lowest priority)
    Defaults = 2,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Overrides => write!(f, "overrides"),
            Layer::User => write!(f, "user"),
            Layer::Defaults => write!(f, "defaults"),
        }
    }
}

/// Read and parse a YAML config file.
///
/// With `allow_missing`, a file that cannot be opened or read yields an empty
/// map instead of an error. The flag never hides bad content: invalid YAML,
/// a non-mapping document, and values a JSON map cannot hold (`.inf`, `.nan`,
/// sequence or mapping keys) are always errors.
///
/// Bytes that are not valid UTF-8 are decoded lossily. Scalar mapping keys
/// are stringified (`404: x` becomes `"404"`), and `<<` merge keys are
/// applied.
pub fn read_config(path: &Path, allow_missing: bool) -> Result<ConfigMap> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if allow_missing => {
            debug!(path = %path.display(), error = %err, "Config file not readable, using empty layer");
            return Ok(ConfigMap::new());
        }
        Err(source) => {
            return Err(Error::ConfigUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    parse_config(&content).map_err(|err| err.at(path))
}

/// Parse failure before a path is attached.
enum ParseError {
    Yaml(serde_yaml::Error),
    Unsupported(String),
    NotAMapping,
}

impl ParseError {
    fn at(self, path: &Path) -> Error {
        let path = path.to_path_buf();
        match self {
            ParseError::Yaml(source) => Error::InvalidYaml { path, source },
            ParseError::Unsupported(detail) => Error::UnsupportedValue { path, detail },
            ParseError::NotAMapping => Error::NotAMapping { path },
        }
    }
}

fn parse_config(content: &str) -> std::result::Result<ConfigMap, ParseError> {
    if content.trim().is_empty() {
        return Ok(ConfigMap::new());
    }
    let mut document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(ParseError::Yaml)?;
    document.apply_merge().map_err(ParseError::Yaml)?;

    match yaml_to_json(document)? {
        Value::Null => Ok(ConfigMap::new()),
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAMapping),
    }
}

/// Convert a YAML value into JSON, stringifying scalar mapping keys.
fn yaml_to_json(value: serde_yaml::Value) -> std::result::Result<Value, ParseError> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => Value::Number(yaml_number_to_json(&n)?),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = ConfigMap::new();
            for (key, value) in mapping {
                map.insert(yaml_key_to_string(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        // Custom tags carry no meaning for config; keep the tagged value.
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number_to_json(n: &serde_yaml::Number) -> std::result::Result<serde_json::Number, ParseError> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| ParseError::Unsupported(format!("non-finite number {}", n)))
}

fn yaml_key_to_string(key: serde_yaml::Value) -> std::result::Result<String, ParseError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key_to_string(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(ParseError::Unsupported(
            "mapping keys must be scalars".to_string(),
        )),
    }
}

/// A merged configuration together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    value: ConfigMap,
    app_name: String,
    project_dir: PathBuf,
    user_config_path: PathBuf,
    default_config_path: PathBuf,
}

impl LoadedConfig {
    /// Get the merged configuration.
    pub fn value(&self) -> &ConfigMap {
        &self.value
    }

    /// Consume and return the merged configuration.
    pub fn into_value(self) -> ConfigMap {
        self.value
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Path of the user layer, whether or not the file existed.
    pub fn user_config_path(&self) -> &Path {
        &self.user_config_path
    }

    /// Path of the defaults layer, whether or not the file existed.
    pub fn default_config_path(&self) -> &Path {
        &self.default_config_path
    }
}

/// Builds configurations from overrides, a user file and project defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    resolver: Resolver,
}

impl ConfigBuilder {
    /// Create a builder using the running process's locations.
    pub fn discover() -> Self {
        Self::with_paths(SystemPaths::discover())
    }

    /// Create a builder with explicit system locations.
    pub fn with_paths(paths: SystemPaths) -> Self {
        Self {
            resolver: Resolver::new(paths),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn paths(&self) -> &SystemPaths {
        self.resolver.paths()
    }

    /// Path to the user config file.
    ///
    /// An explicit `path` is resolved against the working directory; otherwise
    /// the file is `<app_name>.conf.yml` in the home directory.
    pub fn user_config_path(&self, resolved: &ResolvedOptions) -> Result<PathBuf> {
        match resolved.path {
            Some(ref path) => self.paths().resolve(path),
            None => Ok(self
                .paths()
                .home_dir()?
                .join(resolved.user_config_file_name())),
        }
    }

    /// Path to the project defaults file.
    pub fn default_config_path(&self, resolved: &ResolvedOptions) -> Result<PathBuf> {
        self.paths()
            .resolve(&resolved.project_dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Build the merged configuration.
    pub fn build(&self, options: &Options) -> Result<ConfigMap> {
        self.load(options).map(LoadedConfig::into_value)
    }

    /// Build the merged configuration and report the paths that fed it.
    pub fn load(&self, options: &Options) -> Result<LoadedConfig> {
        let resolved = self.resolver.add_defaults(options)?;
        let user_config_path = self.user_config_path(&resolved)?;
        let default_config_path = self.default_config_path(&resolved)?;

        // A missing user file is only tolerated when the caller did not name one.
        let allow_missing_user = options.path().is_none();

        debug!(layer = %Layer::User, path = %user_config_path.display(), "Reading config layer");
        let user = read_config(&user_config_path, allow_missing_user)?;

        debug!(layer = %Layer::Defaults, path = %default_config_path.display(), "Reading config layer");
        let defaults = read_config(&default_config_path, true)?;

        let overrides = resolved.overrides.unwrap_or_default();
        debug!(layer = %Layer::Overrides, keys = overrides.len(), "Applying config layer");
        let value = merge_layers([overrides, user, defaults]);

        Ok(LoadedConfig {
            value,
            app_name: resolved.app_name,
            project_dir: resolved.project_dir,
            user_config_path,
            default_config_path,
        })
    }
}

//! Layered YAML configuration loading.
//!
//! Merges caller overrides, a per-user YAML file and project-level defaults
//! into a single configuration map.
//!
//! ```no_run
//! use serde_json::{Map, json};
//! use yaml_conf::Options;
//!
//! let mut overrides = Map::new();
//! overrides.insert("port".to_string(), json!(8080));
//!
//! let config = yaml_conf::build(&Options::new().with_overrides(overrides))?;
//! println!("{:?}", config.get("port"));
//! # Ok::<(), yaml_conf::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod paths;

pub use config::{ConfigBuilder, ConfigMap, LoadedConfig, Options, ResolvedOptions, Resolver};
pub use error::{Error, ErrorKind, Result};
pub use paths::SystemPaths;

/// Build a configuration using the running process's locations.
///
/// Shorthand for `ConfigBuilder::discover().build(options)`.
pub fn build(options: &Options) -> Result<ConfigMap> {
    ConfigBuilder::discover().build(options)
}

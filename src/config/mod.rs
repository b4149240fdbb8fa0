//! Layered YAML configuration.
//!
//! Builds one configuration map from three layers, merged field by field:
//! 1. **Overrides** - values passed by the caller (highest priority)
//! 2. **User** - `~/<app_name>.conf.yml`, or an explicit `path`
//! 3. **Defaults** - `<project_dir>/default.conf.yml` (lowest priority)
//!
//! ## Defaults
//! - `project_dir` - nearest ancestor of the executable's directory that
//!   contains `package.json`
//! - `app_name` - the `name` field of that `package.json`
//!
//! ## Missing Files
//! - The defaults file is optional.
//! - The user file is optional unless `path` was given explicitly.
//! - A file that exists but is not valid YAML is always an error.

mod loader;
mod merge;
mod resolver;
mod types;

pub use loader::{ConfigBuilder, Layer, LoadedConfig, read_config};
pub use merge::{deep_merge, merge_layers, merge_maps};
pub use resolver::Resolver;
pub use types::*;

//! Default project directory and app name resolution.
//!
//! The project directory is the nearest ancestor of the entry directory that
//! contains `package.json`; the app name is that manifest's `name` field.

use super::types::{MANIFEST_FILE, Options, ResolvedOptions};
use crate::error::{Error, ManifestError, Result};
use crate::paths::SystemPaths;
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Fills in unset `project_dir` and `app_name` on [`Options`].
#[derive(Debug, Clone)]
pub struct Resolver {
    paths: SystemPaths,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::discover()
    }
}

impl Resolver {
    /// Create a resolver using the running process's locations.
    pub fn discover() -> Self {
        Self::new(SystemPaths::discover())
    }

    pub fn new(paths: SystemPaths) -> Self {
        Self { paths }
    }

    /// The system locations this resolver works from.
    pub fn paths(&self) -> &SystemPaths {
        &self.paths
    }

    /// Locate the project directory by walking upward from the entry directory.
    ///
    /// Each directory from the entry directory up to the filesystem root is
    /// checked for `package.json`; the first one that has it is returned.
    pub fn resolve_project_dir(&self) -> Result<PathBuf> {
        let start = self.paths.entry_dir.as_deref().ok_or(Error::EntryDirUnknown)?;

        for dir in start.ancestors() {
            let manifest = dir.join(MANIFEST_FILE);
            trace!(dir = %dir.display(), "Checking for project manifest");
            if manifest.is_file() {
                debug!(project_dir = %dir.display(), "Found project directory");
                return Ok(dir.to_path_buf());
            }
        }

        Err(Error::ProjectDirNotFound {
            start: start.to_path_buf(),
        })
    }

    /// Read the app name from `<project_dir>/package.json`.
    pub fn resolve_app_name(&self, project_dir: &Path) -> Result<String> {
        let path = project_dir.join(MANIFEST_FILE);

        let manifest = read_manifest(&path).map_err(|source| Error::ManifestUnreadable {
            path: path.clone(),
            source,
        })?;

        // Only a non-empty string `name` on a top-level object counts.
        match manifest.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => {
                debug!(app_name = %name, manifest = %path.display(), "Resolved app name");
                Ok(name.to_string())
            }
            _ => Err(Error::AppNameMissing { path }),
        }
    }

    /// Ensure `options` has a project directory.
    ///
    /// Returns `options` itself when it already has one, otherwise a copy
    /// with the discovered directory filled in.
    pub fn add_project_dir<'a>(&self, options: &'a Options) -> Result<Cow<'a, Options>> {
        if options.project_dir().is_some() {
            return Ok(Cow::Borrowed(options));
        }
        let mut result = options.clone();
        result.project_dir = Some(self.resolve_project_dir()?);
        Ok(Cow::Owned(result))
    }

    /// Ensure `options` has an app name.
    ///
    /// The project directory must already be set, since the name is read from
    /// the manifest inside it.
    pub fn add_app_name<'a>(&self, options: &'a Options) -> Result<Cow<'a, Options>> {
        if options.app_name().is_some() {
            return Ok(Cow::Borrowed(options));
        }
        let project_dir = options.project_dir().ok_or(Error::ProjectDirUnset)?;
        let app_name = self.resolve_app_name(&self.paths.resolve(project_dir)?)?;

        let mut result = options.clone();
        result.app_name = Some(app_name);
        Ok(Cow::Owned(result))
    }

    /// Ensure `options` has both a project directory and an app name.
    pub fn add_defaults(&self, options: &Options) -> Result<ResolvedOptions> {
        let with_dir = self.add_project_dir(options)?;
        let with_name = self.add_app_name(&with_dir)?;
        ResolvedOptions::from_options(with_name.into_owned()).ok_or(Error::ProjectDirUnset)
    }
}

fn read_manifest(path: &Path) -> std::result::Result<Value, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn resolver_from(entry_dir: &Path) -> Resolver {
        Resolver::new(SystemPaths::with_dirs(
            Some(entry_dir.to_path_buf()),
            None,
            Some(entry_dir.to_path_buf()),
        ))
    }

    #[test]
    fn test_walks_upward_to_first_manifest() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let c = a.join("b").join("c");
        fs::create_dir_all(&c).unwrap();
        fs::write(a.join("package.json"), r#"{"name": "a"}"#).unwrap();
        // A manifest further up must not be reached.
        fs::write(temp.path().join("package.json"), r#"{"name": "outer"}"#).unwrap();

        let resolver = resolver_from(&c);
        assert_eq!(resolver.resolve_project_dir().unwrap(), a);
    }

    #[test]
    fn test_entry_dir_itself_is_checked_first() {
        let temp = TempDir::new().unwrap();
        let c = temp.path().join("a").join("b").join("c");
        fs::create_dir_all(&c).unwrap();
        fs::write(c.join("package.json"), r#"{"name": "c"}"#).unwrap();
        fs::write(temp.path().join("a").join("package.json"), "{}").unwrap();

        let resolver = resolver_from(&c);
        assert_eq!(resolver.resolve_project_dir().unwrap(), c);
    }

    #[test]
    fn test_manifest_directory_is_not_a_match() {
        let temp = TempDir::new().unwrap();
        let c = temp.path().join("a").join("b").join("c");
        fs::create_dir_all(c.join("package.json")).unwrap();
        fs::write(temp.path().join("a").join("package.json"), "{}").unwrap();

        let resolver = resolver_from(&c);
        assert_eq!(resolver.resolve_project_dir().unwrap(), temp.path().join("a"));
    }

    #[test]
    fn test_walk_to_root_without_manifest_is_not_found() {
        let temp = TempDir::new().unwrap();
        if temp.path().ancestors().any(|dir| dir.join("package.json").is_file()) {
            // A manifest above the temp dir would be found first.
            return;
        }
        let entry = temp.path().join("a").join("b").join("c");
        fs::create_dir_all(&entry).unwrap();

        let err = resolver_from(&entry).resolve_project_dir().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(entry.as_path()));
        assert!(matches!(err, Error::ProjectDirNotFound { .. }));
    }

    #[test]
    fn test_unknown_entry_dir_is_not_found() {
        let resolver = Resolver::new(SystemPaths::with_dirs(None, None, None));
        let err = resolver.resolve_project_dir().unwrap_err();
        assert!(matches!(err, Error::EntryDirUnknown));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_resolve_app_name() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "yaml-conf-test", "version": "1.0.0"}"#,
        )
        .unwrap();

        let resolver = resolver_from(temp.path());
        assert_eq!(resolver.resolve_app_name(temp.path()).unwrap(), "yaml-conf-test");
    }

    #[test]
    fn test_app_name_not_set() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"version": "1.0.0"}"#).unwrap();

        let resolver = resolver_from(temp.path());
        let err = resolver.resolve_app_name(temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(err, Error::AppNameMissing { .. }));
        assert!(err.to_string().contains("was not set"), "got: {}", err);
    }

    #[test]
    fn test_empty_app_name_counts_as_not_set() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": ""}"#).unwrap();

        let resolver = resolver_from(temp.path());
        let err = resolver.resolve_app_name(temp.path()).unwrap_err();
        assert!(matches!(err, Error::AppNameMissing { .. }));
    }

    #[test]
    fn test_manifest_must_be_object_with_string_name() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_from(temp.path());

        for content in [r#"["foo"]"#, r#"{"name": 42}"#, r#""foo""#, "null"] {
            fs::write(temp.path().join("package.json"), content).unwrap();
            let err = resolver.resolve_app_name(temp.path()).unwrap_err();
            assert!(matches!(err, Error::AppNameMissing { .. }), "{}: {:?}", content, err);
        }
    }

    #[test]
    fn test_missing_manifest_is_invalid_input() {
        let temp = TempDir::new().unwrap();

        let resolver = resolver_from(temp.path());
        let err = resolver.resolve_app_name(temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.path(), Some(temp.path().join("package.json").as_path()));
        match err {
            Error::ManifestUnreadable { source, .. } => {
                assert!(matches!(source, ManifestError::Io(_)))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_manifest_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ not json").unwrap();

        let resolver = resolver_from(temp.path());
        match resolver.resolve_app_name(temp.path()).unwrap_err() {
            Error::ManifestUnreadable { source, .. } => {
                assert!(matches!(source, ManifestError::Json(_)))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_add_project_dir_borrows_when_set() {
        let resolver = Resolver::new(SystemPaths::default());
        let options = Options::new().with_project_dir("/project");

        let result = resolver.add_project_dir(&options).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_add_project_dir_copies_when_unset() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
        let nested = temp.path().join("bin");
        fs::create_dir_all(&nested).unwrap();

        let resolver = resolver_from(&nested);
        let options = Options::new().with_app_name("app");
        let result = resolver.add_project_dir(&options).unwrap();

        assert_eq!(result.project_dir(), Some(temp.path()));
        // Caller's value is untouched.
        assert_eq!(options.project_dir, None);
    }

    #[test]
    fn test_add_app_name_requires_project_dir() {
        let resolver = Resolver::new(SystemPaths::default());
        let err = resolver.add_app_name(&Options::new()).unwrap_err();
        assert!(matches!(err, Error::ProjectDirUnset));
    }

    #[test]
    fn test_add_defaults_fills_both() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "from-manifest"}"#).unwrap();

        let resolver = resolver_from(temp.path());
        let options = Options::new().with_path("conf.yml");
        let resolved = resolver.add_defaults(&options).unwrap();

        assert_eq!(resolved.project_dir, temp.path());
        assert_eq!(resolved.app_name, "from-manifest");
        assert_eq!(resolved.path, Some(PathBuf::from("conf.yml")));
        assert_eq!(options, Options::new().with_path("conf.yml"));
    }

    #[test]
    fn test_add_defaults_keeps_explicit_values() {
        // Neither the entry dir nor the manifest is consulted.
        let resolver = Resolver::new(SystemPaths::with_dirs(None, None, None));
        let options = Options::new()
            .with_project_dir("/nowhere")
            .with_app_name("explicit");

        let resolved = resolver.add_defaults(&options).unwrap();
        assert_eq!(resolved.app_name, "explicit");
        assert_eq!(resolved.project_dir, PathBuf::from("/nowhere"));
    }
}

//! Version lookup for artifact naming.
//!
//! The build step asks a [`VersionResolver`] for the version string only after
//! the build tool has succeeded. Two resolvers are provided:
//!
//! - [`PubspecVersion`] reads the `version` field of a Flutter `pubspec.yaml`
//! - [`FixedVersion`] returns a string supplied by configuration or the CLI

use crate::types::PackError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source of the version string embedded in artifact file names.
pub trait VersionResolver {
    /// Returns the version string, e.g. `"1.2.3"`.
    fn resolve(&self) -> Result<String, PackError>;
}

impl<F> VersionResolver for F
where
    F: Fn() -> Result<String, PackError>,
{
    fn resolve(&self) -> Result<String, PackError> {
        self()
    }
}

/// File name of the Flutter project manifest.
pub const PUBSPEC_FILE_NAME: &str = "pubspec.yaml";

#[derive(Debug, Deserialize)]
struct Pubspec {
    version: Option<String>,
}

/// Reads the version from `pubspec.yaml`.
///
/// Flutter versions have the form `<name>+<build number>`; only the name part
/// is returned, so `1.2.3+45` resolves to `1.2.3`.
#[derive(Debug, Clone)]
pub struct PubspecVersion {
    path: PathBuf,
}

impl PubspecVersion {
    /// Creates a resolver for an explicit manifest path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a resolver for `<project_root>/pubspec.yaml`.
    pub fn in_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PUBSPEC_FILE_NAME))
    }

    /// Path of the manifest this resolver reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VersionResolver for PubspecVersion {
    fn resolve(&self) -> Result<String, PackError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            PackError::VersionResolution(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let version = parse_pubspec_version(&contents).map_err(|reason| {
            PackError::VersionResolution(format!("{} in {}", reason, self.path.display()))
        })?;
        validate_version(&version)?;
        Ok(version)
    }
}

fn parse_pubspec_version(contents: &str) -> Result<String, String> {
    let pubspec: Pubspec =
        serde_yaml::from_str(contents).map_err(|e| format!("invalid YAML ({})", e))?;

    let raw = pubspec
        .version
        .ok_or_else(|| "no `version` field".to_string())?;

    let name = raw.split('+').next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(format!("empty `version` field ({:?})", raw));
    }
    Ok(name.to_string())
}

/// Checks that `version` can be embedded in an artifact file name.
///
/// Path separators and `..` are rejected so the artifact always lands
/// directly inside the output directory.
pub fn validate_version(version: &str) -> Result<(), PackError> {
    if version.is_empty() {
        return Err(PackError::VersionResolution(
            "version is empty".to_string(),
        ));
    }
    if version.contains(['/', '\\'])
        || version.contains("..")
        || version.chars().any(char::is_control)
    {
        return Err(PackError::VersionResolution(format!(
            "version {:?} is not usable in a file name",
            version
        )));
    }
    Ok(())
}

/// Returns a preconfigured version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedVersion(String);

impl FixedVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }
}

impl VersionResolver for FixedVersion {
    fn resolve(&self) -> Result<String, PackError> {
        let version = self.0.trim();
        validate_version(version)?;
        Ok(version.to_string())
    }
}

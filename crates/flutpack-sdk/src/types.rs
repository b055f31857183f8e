//! Core types for flutpack-sdk.
//!
//! - [`PackError`] - Error types for the build step and its collaborators
//! - [`BuildResult`] - Output from a successful build

use serde::Serialize;
use std::path::PathBuf;

/// Error types for flutpack-sdk operations.
///
/// Every variant is propagated to the caller unchanged; the build step never
/// retries or recovers locally.
///
/// # Example
///
/// ```ignore
/// use flutpack_sdk::{PackError, builders::AndroidBuilder, version::FixedVersion};
///
/// let builder = AndroidBuilder::new(".", "dist/android", "my_app");
/// match builder.build(&FixedVersion::new("1.2.3")) {
///     Ok(result) => println!("Installed {:?}", result.app_path),
///     Err(PackError::BuildTool { stderr, .. }) => eprintln!("flutter failed:\n{}", stderr),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The build tool could not be spawned or exited with a non-zero status.
    ///
    /// `code` is `None` when the process never started or was killed by a
    /// signal.
    #[error("build tool error: `{command}` {}\n\nStderr:\n{stderr}", exit_label(.code))]
    BuildTool {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The version string for the artifact name could not be determined.
    #[error("version resolution error: {0}")]
    VersionResolution(String),

    /// A filesystem operation on the destination failed.
    #[error("filesystem error at {}: {source}. Check file paths and permissions", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build tool reported success but the expected artifact is absent.
    #[error(
        "artifact missing: build tool exited successfully but produced no file at {}",
        .0.display()
    )]
    ArtifactMissing(PathBuf),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}. Check flutpack.toml or CLI flags")]
    Config(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "did not run to completion".to_string(),
    }
}

impl PackError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result of a successful build step.
///
/// # Example
///
/// ```ignore
/// let result = builder.build(&versions)?;
/// println!("Installer created: {}", result.app_path.display());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// Versioned path the artifact was installed to.
    pub app_path: PathBuf,
    /// Version string embedded in the file name.
    pub version: String,
    /// Location the build tool wrote the artifact to.
    pub source_path: PathBuf,
}

//! Android release build
//!
//! Runs `flutter build apk --obfuscate` in the project root and installs the
//! resulting APK as `<packed_dir>/<app_name>_v<version>-android.apk`.

use super::common::{describe_command, ensure_parent_dir, install_artifact, run_command};
use crate::types::{BuildResult, PackError};
use crate::version::{VersionResolver, validate_version};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Build tool invoked when none is configured.
pub const DEFAULT_TOOL: &str = "flutter";

/// Arguments passed to the build tool.
pub const BUILD_ARGS: [&str; 3] = ["build", "apk", "--obfuscate"];

/// Where the build tool writes the release APK, relative to the project root.
pub const BUILT_APK: &str = "build/app/outputs/flutter-apk/app-release.apk";

/// File extension of the installed artifact.
pub const ARTIFACT_EXT: &str = "apk";

/// Android builder for the release step
///
/// Concurrent builds against the same project root are not supported; callers
/// must serialize them.
#[derive(Debug, Clone)]
pub struct AndroidBuilder {
    /// Flutter project root; the build tool runs here
    project_root: PathBuf,
    /// Directory receiving versioned artifacts
    packed_dir: PathBuf,
    /// Artifact name prefix
    app_name: String,
    /// Build tool executable
    tool: PathBuf,
    /// Arguments placed before `build apk --obfuscate`, e.g. `flutter` for `fvm`
    tool_args: Vec<String>,
    /// Echo the build tool's stdout
    verbose: bool,
    /// Resolve paths and report, but run and copy nothing
    dry_run: bool,
}

impl AndroidBuilder {
    /// Creates a new Android builder
    ///
    /// # Arguments
    ///
    /// * `project_root` - Flutter project directory containing `pubspec.yaml`
    /// * `packed_dir` - Output directory for versioned artifacts
    /// * `app_name` - Prefix of the artifact file name
    pub fn new(
        project_root: impl Into<PathBuf>,
        packed_dir: impl Into<PathBuf>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            packed_dir: packed_dir.into(),
            app_name: app_name.into(),
            tool: PathBuf::from(DEFAULT_TOOL),
            tool_args: Vec::new(),
            verbose: false,
            dry_run: false,
        }
    }

    /// Overrides the build tool executable (default: `flutter`)
    pub fn tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Sets arguments passed to the tool ahead of the build arguments
    pub fn tool_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Enables verbose output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enables dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Location of the APK produced by the build tool
    pub fn built_artifact(&self) -> PathBuf {
        self.project_root.join(BUILT_APK)
    }

    /// Versioned destination for `version`
    pub fn destination(&self, version: &str) -> PathBuf {
        artifact_path(&self.packed_dir, &self.app_name, version)
    }

    /// Command line that runs the build tool
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.tool);
        cmd.args(&self.tool_args)
            .args(BUILD_ARGS)
            .current_dir(&self.project_root);
        cmd
    }

    /// Builds the release APK and installs it under a versioned name
    ///
    /// This performs the following steps:
    /// 1. Run the build tool and wait for it to exit
    /// 2. Resolve the version string
    /// 3. Create the output directory
    /// 4. Copy the APK to `<packed_dir>/<app_name>_v<version>-android.apk`
    ///
    /// Any failure aborts the step and is returned unchanged; a failed step
    /// never leaves a partial file at the destination.
    pub fn build(&self, versions: &dyn VersionResolver) -> Result<BuildResult, PackError> {
        let cmd = self.command();
        let source_path = self.built_artifact();

        if self.dry_run {
            let version = versions.resolve()?;
            validate_version(&version)?;
            let app_path = self.destination(&version);
            tracing::info!(
                "[dry-run] would run `{}` in {}",
                describe_command(&cmd),
                self.project_root.display()
            );
            tracing::info!(
                "[dry-run] would copy {} -> {}",
                source_path.display(),
                app_path.display()
            );
            return Ok(BuildResult {
                app_path,
                version,
                source_path,
            });
        }

        tracing::debug!(
            "Building Android release with `{}`...",
            describe_command(&cmd)
        );
        let output = run_command(cmd)?;
        if self.verbose {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                tracing::debug!(target: "flutpack_sdk::tool", "{}", line);
            }
        }

        let version = versions.resolve()?;
        validate_version(&version)?;
        let app_path = self.destination(&version);

        ensure_parent_dir(&app_path)?;
        install_artifact(&source_path, &app_path)?;

        tracing::info!("Installer created: {}", app_path.display());

        Ok(BuildResult {
            app_path,
            version,
            source_path,
        })
    }
}

/// `<packed_dir>/<app_name>_v<version>-android.apk`
pub fn artifact_path(packed_dir: &Path, app_name: &str, version: &str) -> PathBuf {
    packed_dir.join(format!(
        "{}_v{}-android.{}",
        app_name, version, ARTIFACT_EXT
    ))
}

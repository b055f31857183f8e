//! Common utilities for the build step.
//!
//! - **Project validation** - Checks the Flutter project root before building
//! - **Command execution** - Runs the build tool and turns failures into
//!   [`PackError::BuildTool`] with the captured stderr
//! - **Artifact installation** - Copies the produced file into place without
//!   leaving partial files behind

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::types::PackError;
use crate::version::PUBSPEC_FILE_NAME;

/// Validates that the project root is a Flutter project directory.
///
/// This function checks that:
/// - The path exists
/// - The path is a directory
/// - The directory contains a `pubspec.yaml`
pub fn validate_project_root(project_root: &Path) -> Result<(), PackError> {
    if !project_root.exists() {
        return Err(PackError::Config(format!(
            "Project root does not exist: {}\n\n\
             Ensure you are running from the correct directory or specify --project-root",
            project_root.display()
        )));
    }

    if !project_root.is_dir() {
        return Err(PackError::Config(format!(
            "Project root is not a directory: {}",
            project_root.display()
        )));
    }

    let pubspec = project_root.join(PUBSPEC_FILE_NAME);
    if !pubspec.is_file() {
        return Err(PackError::Config(format!(
            "No {} found in project root {}.\n\n\
             Point `project.base` in flutpack.toml (or --project-root) at the Flutter app",
            PUBSPEC_FILE_NAME,
            project_root.display()
        )));
    }

    Ok(())
}

/// Renders a command line for logs and error messages.
pub fn describe_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs an external command and waits for it to exit.
///
/// Spawn failures and non-zero exits both become [`PackError::BuildTool`]; the
/// error carries the exit code (when there is one) and the captured stderr.
pub fn run_command(mut cmd: Command) -> Result<Output, PackError> {
    let command = describe_command(&cmd);
    tracing::debug!(%command, "spawning");

    let output = cmd.output().map_err(|e| PackError::BuildTool {
        command: command.clone(),
        code: None,
        stderr: format!(
            "Failed to start: {}\n\nEnsure the tool is installed and available on PATH.",
            e
        ),
    })?;

    if !output.status.success() {
        return Err(PackError::BuildTool {
            command,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output)
}

/// Creates the parent directory of `path` (recursively) if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PackError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PackError::filesystem(parent, e))?;
    }
    Ok(())
}

/// Copies `src` to `dest`, replacing any existing file at `dest`.
///
/// The data is first written to a staging file next to `dest` and then renamed
/// over it, so `dest` either holds the complete new artifact or is untouched.
/// A missing `src` is reported as [`PackError::ArtifactMissing`].
pub fn install_artifact(src: &Path, dest: &Path) -> Result<(), PackError> {
    if !src.is_file() {
        return Err(PackError::ArtifactMissing(src.to_path_buf()));
    }

    let staging = staging_path(dest);
    if let Err(e) = fs::copy(src, &staging) {
        let _ = fs::remove_file(&staging);
        if e.kind() == std::io::ErrorKind::NotFound && !src.exists() {
            return Err(PackError::ArtifactMissing(src.to_path_buf()));
        }
        return Err(PackError::filesystem(&staging, e));
    }

    if let Err(e) = fs::rename(&staging, dest) {
        let _ = fs::remove_file(&staging);
        return Err(PackError::filesystem(dest, e));
    }

    Ok(())
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}

//! Configuration file support for flutpack.
//!
//! Project settings live in `flutpack.toml` so the build step can run without
//! repeating CLI flags.
//!
//! ## Configuration File Location
//!
//! The configuration file is searched for in the following order:
//! 1. The path given with `--config`
//! 2. Current working directory (`./flutpack.toml`)
//! 3. Parent directories (up to the repository root or filesystem root)
//!
//! ## Example Configuration
//!
//! ```toml
//! [project]
//! name = "my_app"
//! base = "."
//!
//! [android]
//! packed = "dist/android"
//! tool = "flutter"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use anyhow::{Context, Result};
use flutpack_sdk::PackError;
use flutpack_sdk::builders::android::DEFAULT_TOOL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "flutpack.toml";

/// Output directory used when `android.packed` is not set.
pub const DEFAULT_PACKED_DIR: &str = "packed/android";

/// Root configuration structure for `flutpack.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlutpackConfig {
    /// Project-level configuration.
    pub project: ProjectConfig,

    /// Android build step configuration.
    pub android: AndroidConfig,
}

/// Project-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Application name used as the artifact file name prefix.
    pub name: Option<String>,

    /// Flutter project root (the directory holding `pubspec.yaml`).
    ///
    /// Defaults to the directory containing the config file.
    pub base: Option<PathBuf>,

    /// Version string to use instead of reading `pubspec.yaml`.
    pub version: Option<String>,
}

/// Android build step configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidConfig {
    /// Directory receiving versioned APKs.
    ///
    /// Defaults to `packed/android`.
    pub packed: Option<PathBuf>,

    /// Build tool executable.
    ///
    /// Defaults to `flutter` (looked up on PATH).
    pub tool: String,

    /// Arguments placed before `build apk --obfuscate`.
    ///
    /// For example `tool = "fvm"` with `tool_args = ["flutter"]`.
    pub tool_args: Vec<String>,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            packed: None,
            tool: DEFAULT_TOOL.to_string(),
            tool_args: Vec::new(),
        }
    }
}

impl FlutpackConfig {
    /// Loads configuration from the specified file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: FlutpackConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Attempts to find and load configuration starting from the specified directory.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((config, path)))` - Found and loaded configuration with its path
    /// * `Ok(None)` - No configuration file found
    /// * `Err` - If a config file was found but couldn't be parsed
    pub fn discover_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let config = Self::load_from_file(&config_path)?;
                return Ok(Some((config, config_path)));
            }

            // Stop at repository root or filesystem root
            if current.join(".git").exists() || !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Generates a starter configuration file as a formatted TOML string.
    ///
    /// This includes comments explaining each configuration option.
    pub fn generate_starter_toml(app_name: &str) -> String {
        format!(
            r#"# flutpack configuration file
# CLI flags override these settings when provided.
# Relative paths are resolved against the directory of this file.

[project]
# Application name, used as the artifact file name prefix
name = "{app_name}"

# Flutter project root containing pubspec.yaml (default: this directory)
base = "."

# Version for artifact names (default: read from pubspec.yaml)
# version = "1.0.0"

[android]
# Output directory for versioned APKs
packed = "{packed}"

# Build tool executable (default: flutter on PATH)
tool = "{tool}"

# Arguments inserted before `build apk --obfuscate`, e.g. for FVM:
# tool = "fvm"
# tool_args = ["flutter"]
"#,
            app_name = app_name,
            packed = DEFAULT_PACKED_DIR,
            tool = DEFAULT_TOOL,
        )
    }
}

/// Values given on the command line; each one overrides the config file.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub project_root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub tool: Option<String>,
    pub version: Option<String>,
}

/// Fully resolved inputs of the Android build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub project_root: PathBuf,
    pub packed_dir: PathBuf,
    pub app_name: String,
    pub tool: String,
    pub tool_args: Vec<String>,
    /// Fixed version, if one was configured.
    pub version: Option<String>,
}

/// Configuration resolver that merges config file values with CLI arguments.
///
/// CLI arguments always take precedence over config file values.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    /// Loaded configuration, if any.
    pub config: Option<FlutpackConfig>,

    /// Path to the loaded config file, if any.
    pub config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Loads an explicit config file, or discovers one from `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            let path = absolutize(cwd, path);
            let config = FlutpackConfig::load_from_file(&path)?;
            return Ok(Self {
                config: Some(config),
                config_path: Some(path),
            });
        }

        match FlutpackConfig::discover_from(cwd)? {
            Some((config, path)) => Ok(Self {
                config: Some(config),
                config_path: Some(path),
            }),
            None => Ok(Self::default()),
        }
    }

    /// Directory that relative config paths are resolved against.
    fn config_dir<'a>(&'a self, cwd: &'a Path) -> &'a Path {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(cwd)
    }

    /// Merges CLI overrides, config values and defaults into build settings.
    ///
    /// CLI paths are relative to `cwd`; config paths are relative to the
    /// config file.
    pub fn build_settings(
        &self,
        overrides: BuildOverrides,
        cwd: &Path,
    ) -> Result<BuildSettings, PackError> {
        let config = self.config.clone().unwrap_or_default();
        let config_dir = self.config_dir(cwd);

        let project_root = match overrides.project_root {
            Some(root) => absolutize(cwd, &root),
            None => config
                .project
                .base
                .map(|base| absolutize(config_dir, &base))
                .unwrap_or_else(|| config_dir.to_path_buf()),
        };

        let packed_dir = match overrides.output_dir {
            Some(dir) => absolutize(cwd, &dir),
            None => absolutize(
                config_dir,
                config
                    .android
                    .packed
                    .as_deref()
                    .unwrap_or(Path::new(DEFAULT_PACKED_DIR)),
            ),
        };

        let app_name = overrides
            .name
            .or(config.project.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                PackError::Config(
                    "no application name; set `project.name` or pass --name".to_string(),
                )
            })?;

        if app_name.contains(['/', '\\']) {
            return Err(PackError::Config(format!(
                "application name {:?} must not contain path separators",
                app_name
            )));
        }

        // Configured tool arguments belong to the configured tool.
        let (tool, tool_args) = match overrides.tool {
            Some(tool) => (tool, Vec::new()),
            None => (config.android.tool, config.android.tool_args),
        };

        Ok(BuildSettings {
            project_root,
            packed_dir,
            app_name,
            tool,
            tool_args,
            version: overrides.version.or(config.project.version),
        })
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FlutpackConfig::default();
        assert_eq!(config.project.name, None);
        assert_eq!(config.android.tool, "flutter");
        assert_eq!(config.android.packed, None);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &config_path,
            r#"
[project]
name = "shop"
base = "app"
version = "2.0.0"

[android]
packed = "out/android"
tool = "fvm"
tool_args = ["flutter"]
"#,
        )
        .unwrap();

        let config = FlutpackConfig::load_from_file(&config_path).unwrap();

        assert_eq!(config.project.name.as_deref(), Some("shop"));
        assert_eq!(config.project.base, Some(PathBuf::from("app")));
        assert_eq!(config.project.version.as_deref(), Some("2.0.0"));
        assert_eq!(config.android.packed, Some(PathBuf::from("out/android")));
        assert_eq!(config.android.tool, "fvm");
        assert_eq!(config.android.tool_args, vec!["flutter".to_string()]);
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "[project\nname = ").unwrap();

        let err = FlutpackConfig::load_from_file(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_discover_from_parent() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[project]\nname = \"discovered\"\n",
        )
        .unwrap();
        let nested = temp_dir.path().join("lib/src");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = FlutpackConfig::discover_from(&nested).unwrap().unwrap();

        assert_eq!(config.project.name.as_deref(), Some("discovered"));
        assert_eq!(path, temp_dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_discover_no_config() {
        let temp_dir = TempDir::new().unwrap();
        // Create a .git directory to stop the search
        std::fs::create_dir(temp_dir.path().join(".git")).unwrap();

        let result = FlutpackConfig::discover_from(temp_dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_generate_starter_toml_parses() {
        let toml = FlutpackConfig::generate_starter_toml("my_app");
        assert!(toml.contains("name = \"my_app\""));

        let config: FlutpackConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config.project.name.as_deref(), Some("my_app"));
        assert_eq!(config.project.base, Some(PathBuf::from(".")));
        assert_eq!(config.android.packed, Some(PathBuf::from(DEFAULT_PACKED_DIR)));
    }

    #[test]
    fn test_settings_resolve_against_config_dir() {
        let config: FlutpackConfig = toml::from_str(
            "[project]\nname = \"shop\"\nbase = \"app\"\n[android]\npacked = \"dist\"\n",
        )
        .unwrap();
        let resolver = ConfigResolver {
            config: Some(config),
            config_path: Some(PathBuf::from("/repo/flutpack.toml")),
        };

        let settings = resolver
            .build_settings(BuildOverrides::default(), Path::new("/repo/lib"))
            .unwrap();

        assert_eq!(settings.project_root, PathBuf::from("/repo/app"));
        assert_eq!(settings.packed_dir, PathBuf::from("/repo/dist"));
        assert_eq!(settings.app_name, "shop");
        assert_eq!(settings.tool, "flutter");
        assert_eq!(settings.version, None);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: FlutpackConfig = toml::from_str(
            "[project]\nname = \"shop\"\nversion = \"1.0.0\"\n[android]\ntool = \"fvm\"\ntool_args = [\"flutter\"]\n",
        )
        .unwrap();
        let resolver = ConfigResolver {
            config: Some(config),
            config_path: Some(PathBuf::from("/repo/flutpack.toml")),
        };
        let overrides = BuildOverrides {
            project_root: Some(PathBuf::from("mobile")),
            output_dir: Some(PathBuf::from("/tmp/out")),
            name: Some("shop_beta".to_string()),
            tool: Some("flutter".to_string()),
            version: Some("1.1.0".to_string()),
        };

        let settings = resolver
            .build_settings(overrides, Path::new("/work"))
            .unwrap();

        assert_eq!(settings.project_root, PathBuf::from("/work/mobile"));
        assert_eq!(settings.packed_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.app_name, "shop_beta");
        assert_eq!(settings.tool, "flutter");
        assert!(settings.tool_args.is_empty());
        assert_eq!(settings.version.as_deref(), Some("1.1.0"));
    }

    #[test]
    fn test_settings_without_config_use_cwd() {
        let resolver = ConfigResolver::default();
        let overrides = BuildOverrides {
            name: Some("app".to_string()),
            ..Default::default()
        };

        let settings = resolver
            .build_settings(overrides, Path::new("/work"))
            .unwrap();

        assert_eq!(settings.project_root, PathBuf::from("/work"));
        assert_eq!(settings.packed_dir, PathBuf::from("/work/packed/android"));
    }

    #[test]
    fn test_missing_name_is_config_error() {
        let resolver = ConfigResolver::default();
        let err = resolver
            .build_settings(BuildOverrides::default(), Path::new("/work"))
            .unwrap_err();
        assert!(matches!(err, PackError::Config(_)));
    }

    #[test]
    fn test_name_with_separator_rejected() {
        let resolver = ConfigResolver::default();
        let overrides = BuildOverrides {
            name: Some("../escape".to_string()),
            ..Default::default()
        };
        assert!(
            resolver
                .build_settings(overrides, Path::new("/work"))
                .is_err()
        );
    }

    #[test]
    fn test_load_explicit_config() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("release.toml"),
            "[project]\nname = \"explicit\"\n",
        )
        .unwrap();

        let resolver =
            ConfigResolver::load(Some(Path::new("release.toml")), temp_dir.path()).unwrap();

        assert_eq!(
            resolver.config_path,
            Some(temp_dir.path().join("release.toml"))
        );
        assert_eq!(
            resolver.config.unwrap().project.name.as_deref(),
            Some("explicit")
        );
    }
}

//! # flutpack
//!
//! Command-line tool that builds a Flutter app's Android release and installs
//! the APK under a versioned name.
//!
//! ## Quick Start
//!
//! ```bash
//! # Scaffold flutpack.toml next to pubspec.yaml
//! flutpack init --name my_app
//!
//! # Build and install packed/android/my_app_v<version>-android.apk
//! flutpack build android
//!
//! # Preview the step without running anything
//! flutpack --dry-run build android
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Write a starter `flutpack.toml` |
//! | `build android` | Run `flutter build apk --obfuscate` and install the APK |
//!
//! ## CLI Flags
//!
//! Global flags available on all commands:
//!
//! - **`--config <PATH>`** - Use this config file instead of discovering one
//! - **`--dry-run`** - Preview what would be done without making changes
//! - **`--verbose` / `-v`** - Debug logging, including the build tool's output
//! - **`--json`** - Print the build result as JSON on stdout
//!
//! Log verbosity can also be set with `RUST_LOG`.
//!
//! ## Modules
//!
//! - [`config`] - Configuration file support for `flutpack.toml`

pub mod config;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use flutpack_sdk::builders::{AndroidBuilder, validate_project_root};
use flutpack_sdk::{BuildResult, FixedVersion, PubspecVersion, VersionResolver};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::{BuildOverrides, BuildSettings, CONFIG_FILE_NAME, ConfigResolver, FlutpackConfig};

/// Build Flutter Android releases into versioned output paths.
#[derive(Parser, Debug)]
#[command(name = "flutpack", author, version, about = "Flutter release build step", long_about = None)]
struct Cli {
    /// Path to flutpack.toml (default: discovered from the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preview what would be done without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the build result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a release artifact.
    Build {
        #[command(subcommand)]
        platform: Platform,
    },
    /// Scaffold a flutpack.toml config file.
    Init {
        #[arg(long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,
        #[arg(long, help = "Application name (default: current directory name)")]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum Platform {
    /// Build the obfuscated release APK and install it under a versioned name.
    Android(AndroidArgs),
}

#[derive(Args, Debug)]
struct AndroidArgs {
    #[arg(long, help = "Flutter project root (overrides project.base)")]
    project_root: Option<PathBuf>,
    #[arg(long, help = "Output directory for APKs (overrides android.packed)")]
    output_dir: Option<PathBuf>,
    #[arg(long, help = "Application name (overrides project.name)")]
    name: Option<String>,
    #[arg(long, help = "Build tool executable (overrides android.tool)")]
    tool: Option<String>,
    #[arg(long, help = "Version for the artifact name instead of pubspec.yaml")]
    version_override: Option<String>,
}

impl From<AndroidArgs> for BuildOverrides {
    fn from(args: AndroidArgs) -> Self {
        Self {
            project_root: args.project_root,
            output_dir: args.output_dir,
            name: args.name,
            tool: args.tool,
            version: args.version_override,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    match cli.command {
        Command::Build {
            platform: Platform::Android(args),
        } => {
            let resolver = ConfigResolver::load(cli.config.as_deref(), &cwd)?;
            let result = cmd_build_android(&resolver, args.into(), &cwd, cli.dry_run, cli.verbose)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::Init { output, name } => {
            cmd_init(&cwd.join(output), name, &cwd)?;
        }
    }

    Ok(())
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Resolves settings and runs the Android build step.
fn cmd_build_android(
    resolver: &ConfigResolver,
    overrides: BuildOverrides,
    cwd: &Path,
    dry_run: bool,
    verbose: bool,
) -> Result<BuildResult> {
    if let Some(config_path) = &resolver.config_path {
        tracing::info!("Using config file: {}", config_path.display());
    }

    let settings = resolver.build_settings(overrides, cwd)?;
    tracing::debug!(?settings, "resolved build settings");

    validate_project_root(&settings.project_root)?;

    let builder = builder_for(&settings).verbose(verbose).dry_run(dry_run);
    let versions = version_resolver(&settings);
    let result = builder.build(versions.as_ref())?;
    Ok(result)
}

fn builder_for(settings: &BuildSettings) -> AndroidBuilder {
    AndroidBuilder::new(
        &settings.project_root,
        &settings.packed_dir,
        settings.app_name.clone(),
    )
    .tool(&settings.tool)
    .tool_args(settings.tool_args.iter().cloned())
}

/// A configured version wins over `pubspec.yaml`.
fn version_resolver(settings: &BuildSettings) -> Box<dyn VersionResolver> {
    match &settings.version {
        Some(version) => Box::new(FixedVersion::new(version.clone())),
        None => Box::new(PubspecVersion::in_project(&settings.project_root)),
    }
}

/// Writes a starter config file; refuses to overwrite an existing one.
fn cmd_init(output: &Path, name: Option<String>, cwd: &Path) -> Result<()> {
    if output.exists() {
        bail!("refusing to overwrite existing file: {:?}", output);
    }

    let name = match name {
        Some(name) => name,
        None => cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Could not derive an application name; pass --name")?,
    };

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating parent directory {:?}", parent))?;
    }

    let contents = FlutpackConfig::generate_starter_toml(&name);
    fs::write(output, contents).with_context(|| format!("writing file {:?}", output))?;
    tracing::info!("Generated {}", output.display());

    Ok(())
}

//! Flutter Android release step
//!
//! `flutpack-sdk` runs `flutter build apk --obfuscate` for a Flutter project and
//! installs the release APK as `<packed_dir>/<app_name>_v<version>-android.apk`.
//!
//! # Example
//!
//! ```ignore
//! use flutpack_sdk::builders::AndroidBuilder;
//! use flutpack_sdk::version::PubspecVersion;
//!
//! fn main() -> Result<(), flutpack_sdk::PackError> {
//!     let root = std::path::Path::new("my_app");
//!     let result = AndroidBuilder::new(root, "dist/android", "my_app")
//!         .build(&PubspecVersion::in_project(root))?;
//!     println!("Installer created: {}", result.app_path.display());
//!     Ok(())
//! }
//! ```

pub mod builders;
pub mod types;
pub mod version;

pub use types::{BuildResult, PackError};
pub use version::{FixedVersion, PubspecVersion, VersionResolver, validate_version};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

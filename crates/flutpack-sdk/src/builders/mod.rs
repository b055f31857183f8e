//! Build automation for the Android release step.
//!
//! [`AndroidBuilder`] runs the Flutter toolchain and installs the produced APK
//! under a versioned file name. The `common` module holds the pieces that are
//! not Android specific:
//!
//! - Project root validation
//! - Command execution with the tool's stderr captured into the error
//! - Staged artifact copies that never leave partial files behind
//!
//! ## Example
//!
//! ```ignore
//! use flutpack_sdk::builders::AndroidBuilder;
//! use flutpack_sdk::version::PubspecVersion;
//!
//! let builder = AndroidBuilder::new("app", "dist/android", "my_app")
//!     .verbose(true);
//! let result = builder.build(&PubspecVersion::in_project("app".as_ref()))?;
//! println!("APK: {}", result.app_path.display());
//! # Ok::<(), flutpack_sdk::PackError>(())
//! ```

pub mod android;
pub mod common;

pub use android::{AndroidBuilder, artifact_path};
pub use common::validate_project_root;

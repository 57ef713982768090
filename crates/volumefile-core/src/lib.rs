//! volumefile-core: resolve `volumefile:` references in configuration trees
//!
//! Configuration values of the form `volumefile:<name>` point at files on a
//! volume mounted at the directory named by `PCR_VOLUME_MOUNT`. This crate
//! walks a configuration tree, reads every referenced file and substitutes
//! the file contents in place.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use volumefile_core::{MapProvider, Value, VolumeClient, MOUNT_VARIABLE};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("db-pass"), "s3cret").unwrap();
//!
//! let provider = MapProvider::new().with(MOUNT_VARIABLE, dir.path().display().to_string());
//! let client = VolumeClient::with_provider(Arc::new(provider));
//!
//! let mut config = Value::from_yaml("database:\n  password: volumefile:db-pass\n").unwrap();
//! client.resolve_volume_files(&mut config).unwrap();
//!
//! assert_eq!(config.get_path("database.password").unwrap().as_str(), Some("s3cret"));
//! ```

pub mod error;
pub mod provider;
pub mod resolver;
pub mod value;

mod client;

pub use client::VolumeClient;
pub use error::{Error, ErrorKind, Result};
pub use provider::{EnvProvider, FnProvider, MapProvider, ValueProvider};
pub use resolver::{ResolvedPaths, MOUNT_VARIABLE, VOLUME_FILE_PREFIX};
pub use value::{PathSegment, Value, ValuePath};

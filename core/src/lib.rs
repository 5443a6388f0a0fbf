//! Folder-organised photo catalog backed by a plain directory tree.

#![deny(missing_debug_implementations)]

pub mod capture;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fs;
pub mod log;
pub mod store;
pub mod types;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub use catalog::Catalog;
pub use config::{CatalogConfig, DEFAULT_FOLDER_NAME};
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use types::{Folder, Photo, Preferences};

/// Returns the version of the core crate for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

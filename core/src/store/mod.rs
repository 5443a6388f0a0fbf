//! Persistent key-value state kept next to the catalog.

pub mod preferences;

pub use preferences::PreferenceStore;

pub type Result<T> = crate::Result<T>;

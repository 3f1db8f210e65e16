//! Object storage for recipe assets.
//!
//! This crate provides the ObjectStore trait and implementations for
//! S3-compatible services and the local filesystem, plus the shared
//! storage-key derivation used by the publishing pipeline.
//!
//! # Storage key format
//!
//! Every attachment of a recipe is written under the recipe's namespace. All
//! backends use the same key layout for consistency:
//!
//! - `{recipe_id}/images/{token}-{filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key derivation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_object_store;
pub use keys::{asset_key, sanitize_filename};
pub use ladle_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalObjectStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStore;
pub use traits::{ObjectStore, StorageError, StorageResult};

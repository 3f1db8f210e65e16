//! Core domain types for the ladle recipe publishing pipeline.
//!
//! This crate carries the data model (drafts, attachments, recipe
//! identifiers, taxonomy catalog entries), draft validation, and the
//! environment-driven configuration shared by the storage, database,
//! and pipeline crates.

pub mod config;
pub mod models;
pub mod validation;

pub use config::{PublisherConfig, StorageBackend};
pub use models::*;
pub use validation::{validate_draft, ValidationError};

//! In-memory doubles for the pipeline's store boundaries
//!
//! Both stores behind the coordinator are trait objects, so tests (and
//! embedders) can run the full pipeline without a bucket or a database.
//! Faults are injected per key or per URL to drive the abort and
//! partial-failure paths.

pub mod object_store;
pub mod recipe_store;

pub use object_store::MockObjectStore;
pub use recipe_store::MockRecipeStore;

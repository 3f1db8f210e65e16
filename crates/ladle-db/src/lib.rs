//! Relational persistence for published recipes.
//!
//! Provides the RecipeStore trait consumed by the publishing pipeline,
//! sqlx-backed repositories over Postgres, taxonomy catalog reads, and
//! pool/migration setup.

pub mod db;
pub mod pool;
pub mod traits;

// Re-export commonly used types
pub use db::catalog::CatalogRepository;
pub use db::recipe::RecipeRepository;
pub use pool::{connect_pool, run_migrations};
pub use traits::RecipeStore;

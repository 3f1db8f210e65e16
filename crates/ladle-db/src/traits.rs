//! Store trait abstractions for the publishing pipeline
//!
//! The commit coordinator depends on this minimal interface rather than on
//! the concrete sqlx repositories, allowing tests and embedders to substitute
//! in-memory stores without a database.

use anyhow::Result;
use async_trait::async_trait;
use ladle_core::models::{PersistedRecipe, RecipeId};

use crate::db::recipe::RecipeRepository;

/// Relational-store boundary for the publishing pipeline.
///
/// Each method is a single-row insert. No transaction spans the two calls or
/// the two tables; the coordinator's phase ordering is the only consistency
/// mechanism between them.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert the recipe row (Phase B).
    async fn insert_recipe(&self, recipe: &PersistedRecipe) -> Result<()>;

    /// Insert one (recipe, asset URL) association row (Phase C).
    async fn insert_asset_association(&self, recipe_id: RecipeId, url: &str) -> Result<()>;
}

// Implementation for the concrete repository type

#[async_trait]
impl RecipeStore for RecipeRepository {
    async fn insert_recipe(&self, recipe: &PersistedRecipe) -> Result<()> {
        RecipeRepository::insert_recipe(self, recipe).await
    }

    async fn insert_asset_association(&self, recipe_id: RecipeId, url: &str) -> Result<()> {
        RecipeRepository::insert_asset_association(self, recipe_id, url).await
    }
}

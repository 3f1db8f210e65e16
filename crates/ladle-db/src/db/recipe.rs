use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ladle_core::models::{PersistedRecipe, RecipeId};
use sqlx::postgres::types::PgInterval;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::interval::{duration_from_interval, interval_from_duration};

#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the recipe row. A single-row insert with no surrounding
    /// transaction; the pipeline's phase ordering is the only thing keeping
    /// this table consistent with recipe_images.
    #[tracing::instrument(skip(self, recipe), fields(db.table = "recipes", db.operation = "insert", db.record_id = %recipe.id))]
    pub async fn insert_recipe(&self, recipe: &PersistedRecipe) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipes
                (id, owner_id, title, overview, prep_time, cook_time,
                 ingredients, instructions, note, category_id, occasion_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(recipe.id.as_uuid())
        .bind(recipe.owner_id)
        .bind(&recipe.title)
        .bind(&recipe.overview)
        .bind(interval_from_duration(recipe.prep_time))
        .bind(interval_from_duration(recipe.cook_time))
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.note)
        .bind(recipe.category_id)
        .bind(recipe.occasion_id)
        .bind(recipe.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert recipe")?;

        Ok(())
    }

    /// Insert one (recipe, asset URL) association row. Idempotent by its
    /// (recipe_id, url) key so caller-driven retries cannot duplicate rows.
    #[tracing::instrument(skip(self), fields(db.table = "recipe_images", db.operation = "insert", db.record_id = %recipe_id))]
    pub async fn insert_asset_association(&self, recipe_id: RecipeId, url: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_images (recipe_id, url, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (recipe_id, url) DO NOTHING
            "#,
        )
        .bind(recipe_id.as_uuid())
        .bind(url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert asset association")?;

        Ok(())
    }

    /// Fetch a published recipe row.
    #[tracing::instrument(skip(self), fields(db.table = "recipes", db.operation = "select", db.record_id = %recipe_id))]
    pub async fn get_recipe(&self, recipe_id: RecipeId) -> Result<Option<PersistedRecipe>> {
        type RecipeRow = (
            Uuid,
            Uuid,
            String,
            String,
            PgInterval,
            PgInterval,
            String,
            String,
            Option<String>,
            i32,
            i32,
            DateTime<Utc>,
        );

        let row = sqlx::query_as::<Postgres, RecipeRow>(
            r#"
            SELECT id, owner_id, title, overview, prep_time, cook_time,
                   ingredients, instructions, note, category_id, occasion_id, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(recipe_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch recipe")?;

        Ok(row.map(
            |(
                id,
                owner_id,
                title,
                overview,
                prep_time,
                cook_time,
                ingredients,
                instructions,
                note,
                category_id,
                occasion_id,
                created_at,
            )| PersistedRecipe {
                id: id.into(),
                owner_id,
                title,
                overview,
                prep_time: duration_from_interval(&prep_time),
                cook_time: duration_from_interval(&cook_time),
                ingredients,
                instructions,
                note,
                category_id,
                occasion_id,
                created_at,
            },
        ))
    }

    /// List the asset URLs associated with a recipe, in insertion order.
    #[tracing::instrument(skip(self), fields(db.table = "recipe_images", db.operation = "select", db.record_id = %recipe_id))]
    pub async fn list_asset_urls(&self, recipe_id: RecipeId) -> Result<Vec<String>> {
        let urls = sqlx::query_scalar::<Postgres, String>(
            "SELECT url FROM recipe_images WHERE recipe_id = $1 ORDER BY created_at, url",
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list asset associations")?;

        Ok(urls)
    }
}

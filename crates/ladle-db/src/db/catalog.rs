use anyhow::{Context, Result};
use ladle_core::models::{Category, Occasion};
use sqlx::{PgPool, Postgres};

/// Read-only access to the externally owned taxonomy catalogs. Consumed by
/// the selection surface, never by the commit coordinator.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "select"))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<Postgres, (i32, String)>(
            "SELECT id, name FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Category { id, name })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "occasions", db.operation = "select"))]
    pub async fn list_occasions(&self) -> Result<Vec<Occasion>> {
        let rows = sqlx::query_as::<Postgres, (i32, String)>(
            "SELECT id, name FROM occasions ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list occasions")?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Occasion { id, name })
            .collect())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::{Draft, TaxonomySelection};

/// Opaque recipe identifier, allocated before any store is touched.
///
/// Every storage key of the attempt is derived from this value, so all blobs
/// of one recipe share one prefix even while the relational row does not
/// exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Allocates a fresh 128-bit random identifier. Pure, no failure mode;
    /// called exactly once per submission attempt.
    pub fn allocate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for RecipeId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage key and publicly addressable URL for one uploaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Slot index the attachment occupied in the draft.
    pub slot: usize,
    pub storage_key: String,
    pub url: String,
}

/// The single relational row created for a published recipe in Phase B.
/// Never updated by the pipeline; deletion is an external admin concern.
#[derive(Debug, Clone, Serialize)]
pub struct PersistedRecipe {
    pub id: RecipeId,
    pub owner_id: Uuid,
    pub title: String,
    pub overview: String,
    pub prep_time: Duration,
    pub cook_time: Duration,
    pub ingredients: String,
    pub instructions: String,
    pub note: Option<String>,
    pub category_id: i32,
    pub occasion_id: i32,
    pub created_at: DateTime<Utc>,
}

impl PersistedRecipe {
    /// Snapshots a validated draft and its frozen selection into row shape.
    pub fn from_draft(id: RecipeId, draft: &Draft, selection: TaxonomySelection) -> Self {
        Self {
            id,
            owner_id: draft.owner_id,
            title: draft.title.clone(),
            overview: draft.overview.clone(),
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            ingredients: draft.ingredients.clone(),
            instructions: draft.instructions.clone(),
            note: draft.note.clone(),
            category_id: selection.category_id,
            occasion_id: selection.occasion_id,
            created_at: Utc::now(),
        }
    }
}

use ladle_core::ValidationError;
use thiserror::Error;

use crate::gate::GateError;
use crate::uploader::UploadError;

/// Why a submission attempt ended with nothing committed.
///
/// Every variant is fatal to its attempt. Association failures after the
/// recipe row commits are deliberately absent here; they surface as the
/// failed slots of a partial result instead.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The draft failed validation before any network call.
    #[error("draft validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The gate refused to open, or the selection never arrived.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// At least one upload genuinely failed and the group was abandoned.
    /// Blobs that landed before cancellation stay orphaned in the object
    /// store; no relational row references them.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The recipe row insert failed. Uploaded blobs are orphaned; no
    /// association rows exist, so readers cannot observe a half recipe.
    #[error("recipe insert failed")]
    RecipeInsert(#[source] anyhow::Error),
}

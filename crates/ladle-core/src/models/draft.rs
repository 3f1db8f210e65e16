use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One image file attached to a draft. The slot index is the attachment's
/// position in the draft's slot vector, not a field of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub bytes: Bytes,
    pub filename: String,
}

impl Attachment {
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// The required (category, occasion) pair gating submission.
///
/// Both identifiers are foreign keys into externally owned catalogs. The
/// pipeline only ever receives this type fully formed, so a half-chosen
/// selection cannot reach Phase A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySelection {
    pub category_id: i32,
    pub occasion_id: i32,
}

/// A not-yet-persisted recipe submission as composed by the client.
///
/// Handed to the commit coordinator by value: the composer may keep mutating
/// its own copy, but the attempt runs on this snapshot.
#[derive(Debug, Clone)]
pub struct Draft {
    pub owner_id: Uuid,
    pub title: String,
    pub overview: String,
    pub prep_time: Duration,
    pub cook_time: Duration,
    pub ingredients: String,
    pub instructions: String,
    pub note: Option<String>,
    /// Ordered attachment slots; an untouched slot stays `None`.
    pub attachments: Vec<Option<Attachment>>,
}

impl Draft {
    /// Number of attachments actually present, empty slots excluded.
    pub fn attachment_count(&self) -> usize {
        self.attachments.iter().filter(|slot| slot.is_some()).count()
    }
}

//! Recipe publishing pipeline.
//!
//! Turns a composed draft into durable state split across two independent
//! backing services: blob uploads to an object store (Phase A), the recipe
//! row insert (Phase B), and per-asset association inserts (Phase C). There
//! is no cross-store transaction; the coordinator's phase ordering and its
//! asymmetric failure policy around the Phase B commit point are the whole
//! contract.
//!
//! A submission attempt starts by opening the [`TaxonomyGate`], which hands
//! out a one-shot [`SubmissionPermit`]. The permit is what makes "at most one
//! coordinator run per draft" a structural guarantee rather than a convention:
//! a second open fails while the first attempt is in flight, and a repeated
//! selection delivery is a no-op.

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod result;
pub mod test_helpers;
pub mod uploader;

// Re-export commonly used types
pub use coordinator::{CommitCoordinator, PublishPhase};
pub use error::PublishError;
pub use gate::{GateError, SubmissionPermit, TaxonomyGate};
pub use result::SubmissionResult;
pub use uploader::{SlotFailure, UploadError, UploadOrchestrator};

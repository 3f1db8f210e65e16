//! Concurrent attachment upload with first-failure group abandonment.
//!
//! All occupied slots of a draft upload concurrently under one cancellation
//! token. The first genuine failure cancels every sibling still in flight;
//! siblings that already finished stay in the object store as orphans, but no
//! partial record set ever reaches the caller. Success yields one
//! [`AssetRecord`] per occupied slot, ordered by slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use ladle_core::{AssetRecord, Attachment, RecipeId};
use ladle_storage::{asset_key, ObjectStore, StorageError};

/// One attachment slot whose upload genuinely failed (error or timeout).
/// Slots abandoned by cancellation are not failures and are not listed.
#[derive(Debug, Error)]
#[error("slot {slot}: {source}")]
pub struct SlotFailure {
    pub slot: usize,
    #[source]
    pub source: StorageError,
}

/// The upload group was abandoned. Carries every genuine failure, ordered by
/// slot; at least one is always present.
#[derive(Debug, Error)]
#[error("upload failed for attachment slot(s) {:?}", .failures.iter().map(|f| f.slot).collect::<Vec<_>>())]
pub struct UploadError {
    pub failures: Vec<SlotFailure>,
}

impl UploadError {
    /// Slot indices of the genuine failures, ordered by slot.
    pub fn failed_slots(&self) -> Vec<usize> {
        self.failures.iter().map(|failure| failure.slot).collect()
    }
}

enum SlotOutcome {
    Uploaded(AssetRecord),
    Failed(SlotFailure),
    Cancelled(usize),
}

/// Uploads a draft's attachments as one all-or-nothing group.
pub struct UploadOrchestrator {
    store: Arc<dyn ObjectStore>,
    upload_timeout: Duration,
}

impl UploadOrchestrator {
    pub fn new(store: Arc<dyn ObjectStore>, upload_timeout: Duration) -> Self {
        Self {
            store,
            upload_timeout,
        }
    }

    /// Upload every occupied slot concurrently.
    ///
    /// A draft with no attachments resolves immediately without touching the
    /// store. Keys are derived from `recipe_id`, so every blob of the attempt
    /// lands under the same prefix.
    pub async fn upload_all(
        &self,
        recipe_id: RecipeId,
        attachments: &[Option<Attachment>],
    ) -> Result<Vec<AssetRecord>, UploadError> {
        let work: Vec<(usize, String, Bytes)> = attachments
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| {
                entry.as_ref().map(|attachment| {
                    (
                        slot,
                        asset_key(recipe_id, &attachment.filename),
                        attachment.bytes.clone(),
                    )
                })
            })
            .collect();

        if work.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let cancel = CancellationToken::new();
        let mut in_flight: FuturesUnordered<_> = work
            .into_iter()
            .map(|(slot, key, data)| {
                upload_slot(
                    self.store.as_ref(),
                    self.upload_timeout,
                    &cancel,
                    slot,
                    key,
                    data,
                )
            })
            .collect();

        let mut records: Vec<Option<AssetRecord>> = vec![None; attachments.len()];
        let mut failures: Vec<SlotFailure> = Vec::new();

        while let Some(outcome) = in_flight.next().await {
            match outcome {
                SlotOutcome::Uploaded(record) => {
                    tracing::debug!(
                        slot = record.slot,
                        key = %record.storage_key,
                        "attachment uploaded"
                    );
                    let slot = record.slot;
                    records[slot] = Some(record);
                }
                SlotOutcome::Failed(failure) => {
                    tracing::warn!(
                        slot = failure.slot,
                        error = %failure.source,
                        "attachment upload failed, cancelling group"
                    );
                    cancel.cancel();
                    failures.push(failure);
                }
                SlotOutcome::Cancelled(slot) => {
                    tracing::debug!(slot, "attachment upload cancelled");
                }
            }
        }

        if failures.is_empty() {
            let records: Vec<AssetRecord> = records.into_iter().flatten().collect();
            tracing::info!(
                recipe_id = %recipe_id,
                uploaded = records.len(),
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                "attachment group uploaded"
            );
            Ok(records)
        } else {
            failures.sort_by_key(|failure| failure.slot);
            Err(UploadError { failures })
        }
    }
}

/// One slot's upload, raced against the group's cancellation token and the
/// per-call timeout. Dropping the put future is what cancellation means; the
/// store may or may not have persisted the blob by then.
async fn upload_slot(
    store: &dyn ObjectStore,
    upload_timeout: Duration,
    cancel: &CancellationToken,
    slot: usize,
    key: String,
    data: Bytes,
) -> SlotOutcome {
    tokio::select! {
        _ = cancel.cancelled() => SlotOutcome::Cancelled(slot),
        result = tokio::time::timeout(upload_timeout, store.put(&key, data)) => match result {
            Ok(Ok(url)) => SlotOutcome::Uploaded(AssetRecord {
                slot,
                storage_key: key,
                url,
            }),
            Ok(Err(source)) => SlotOutcome::Failed(SlotFailure { slot, source }),
            Err(_) => SlotOutcome::Failed(SlotFailure {
                slot,
                source: StorageError::Timeout(upload_timeout),
            }),
        },
    }
}

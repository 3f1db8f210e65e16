//! The commit coordinator: one submission attempt from draft to outcome.
//!
//! An attempt runs three phases against two stores that share no
//! transaction. Phase A uploads attachments; Phase B inserts the recipe row;
//! Phase C inserts one association row per uploaded asset. Phase ordering is
//! the only consistency mechanism: any failure before Phase B commits aborts
//! the whole attempt with nothing relational written, while failures after
//! Phase B commits can only shrink the recipe's visible image set, never
//! unpublish it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use ladle_core::{validate_draft, AssetRecord, Draft, PersistedRecipe, RecipeId};
use ladle_db::RecipeStore;
use ladle_storage::ObjectStore;

use crate::error::PublishError;
use crate::gate::SubmissionPermit;
use crate::result::{report, SubmissionResult, Terminal};
use crate::uploader::UploadOrchestrator;

/// Observable lifecycle of one submission attempt. Strictly forward; an
/// attempt never revisits a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    Idle,
    AwaitingTaxonomy,
    Uploading,
    PersistingRecipe,
    AssociatingAssets,
    Done,
    Aborted,
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingTaxonomy => "awaiting_taxonomy",
            Self::Uploading => "uploading",
            Self::PersistingRecipe => "persisting_recipe",
            Self::AssociatingAssets => "associating_assets",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Drives submission attempts against the object and relational stores.
///
/// Holds no per-attempt state; all attempt state lives on [`publish`]'s
/// stack, so one coordinator serves any number of sequential attempts.
///
/// [`publish`]: CommitCoordinator::publish
pub struct CommitCoordinator {
    uploader: UploadOrchestrator,
    recipes: Arc<dyn RecipeStore>,
    insert_timeout: Duration,
}

impl CommitCoordinator {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        recipes: Arc<dyn RecipeStore>,
        upload_timeout: Duration,
        insert_timeout: Duration,
    ) -> Self {
        Self {
            uploader: UploadOrchestrator::new(objects, upload_timeout),
            recipes,
            insert_timeout,
        }
    }

    /// Run one submission attempt to its terminal outcome.
    ///
    /// The permit must come from the gate guarding this draft; the attempt
    /// suspends until the selection surface resolves or abandons it. Always
    /// returns a result, never panics the attempt away: every store error is
    /// mapped to [`SubmissionResult::Failure`] or a partial outcome.
    pub async fn publish(&self, draft: Draft, permit: SubmissionPermit) -> SubmissionResult {
        let terminal = self.run(draft, permit).await;
        let result = report(terminal);
        match &result {
            SubmissionResult::Success { recipe_id } => {
                tracing::info!(recipe_id = %recipe_id, "recipe published");
            }
            SubmissionResult::PartialFailure {
                recipe_id,
                failed_slots,
            } => {
                tracing::warn!(
                    recipe_id = %recipe_id,
                    failed_slots = ?failed_slots,
                    "recipe published with missing asset associations"
                );
            }
            SubmissionResult::Failure { error } => {
                tracing::warn!(error = %error, "submission aborted, nothing committed");
            }
        }
        result
    }

    async fn run(&self, draft: Draft, mut permit: SubmissionPermit) -> Terminal {
        let mut phase = PublishPhase::Idle;

        // Validation is local; a rejected draft never reaches a store or
        // the taxonomy wait.
        if let Err(error) = validate_draft(&draft) {
            return abort(phase, error.into());
        }

        advance(&mut phase, PublishPhase::AwaitingTaxonomy);
        let selection = match permit.selection().await {
            Ok(selection) => selection,
            Err(error) => return abort(phase, error.into()),
        };

        // Allocated exactly once, before any store is touched; every storage
        // key and the eventual row share this identifier.
        let recipe_id = RecipeId::allocate();

        advance(&mut phase, PublishPhase::Uploading);
        let records = match self.uploader.upload_all(recipe_id, &draft.attachments).await {
            Ok(records) => records,
            Err(error) => return abort(phase, error.into()),
        };

        advance(&mut phase, PublishPhase::PersistingRecipe);
        let recipe = PersistedRecipe::from_draft(recipe_id, &draft, selection);
        if let Err(error) = self.insert_recipe(&recipe).await {
            return abort(phase, PublishError::RecipeInsert(error));
        }

        // The recipe row is committed. From here on the attempt can no
        // longer abort, only report association failures.
        advance(&mut phase, PublishPhase::AssociatingAssets);
        let failed_slots = self.associate_assets(recipe_id, &records).await;

        advance(&mut phase, PublishPhase::Done);
        Terminal::Committed {
            recipe_id,
            failed_slots,
        }
    }

    async fn insert_recipe(&self, recipe: &PersistedRecipe) -> Result<(), anyhow::Error> {
        match tokio::time::timeout(self.insert_timeout, self.recipes.insert_recipe(recipe)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "recipe insert timed out after {:?}",
                self.insert_timeout
            )),
        }
    }

    /// Phase C: one association insert per uploaded asset, all concurrent,
    /// each independent. Returns the slots whose insert failed, ordered by
    /// slot.
    async fn associate_assets(&self, recipe_id: RecipeId, records: &[AssetRecord]) -> Vec<usize> {
        let inserts = records.iter().map(|record| async move {
            let insert = self.recipes.insert_asset_association(recipe_id, &record.url);
            match tokio::time::timeout(self.insert_timeout, insert).await {
                Ok(Ok(())) => None,
                Ok(Err(error)) => {
                    tracing::warn!(
                        recipe_id = %recipe_id,
                        slot = record.slot,
                        error = %error,
                        "asset association failed"
                    );
                    Some(record.slot)
                }
                Err(_) => {
                    tracing::warn!(
                        recipe_id = %recipe_id,
                        slot = record.slot,
                        timeout = ?self.insert_timeout,
                        "asset association timed out"
                    );
                    Some(record.slot)
                }
            }
        });

        // join_all preserves input order, and records are slot-ordered.
        join_all(inserts).await.into_iter().flatten().collect()
    }
}

fn advance(phase: &mut PublishPhase, next: PublishPhase) {
    tracing::debug!(from = %phase, to = %next, "publish phase transition");
    *phase = next;
}

fn abort(phase: PublishPhase, error: PublishError) -> Terminal {
    tracing::debug!(
        from = %phase,
        to = %PublishPhase::Aborted,
        "publish phase transition"
    );
    Terminal::Aborted(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::TaxonomyGate;
    use crate::test_helpers::{MockObjectStore, MockRecipeStore};
    use ladle_core::TaxonomySelection;
    use uuid::Uuid;

    fn bare_draft() -> Draft {
        Draft {
            owner_id: Uuid::new_v4(),
            title: "Khmer Soup".to_string(),
            overview: "Sour soup".to_string(),
            prep_time: Duration::from_secs(900),
            cook_time: Duration::from_secs(2400),
            ingredients: "lemongrass".to_string(),
            instructions: "simmer".to_string(),
            note: None,
            attachments: Vec::new(),
        }
    }

    fn coordinator(
        objects: &MockObjectStore,
        recipes: &MockRecipeStore,
        insert_timeout: Duration,
    ) -> CommitCoordinator {
        CommitCoordinator::new(
            Arc::new(objects.clone()),
            Arc::new(recipes.clone()),
            Duration::from_secs(5),
            insert_timeout,
        )
    }

    #[tokio::test]
    async fn invalid_draft_aborts_before_the_taxonomy_wait() {
        let objects = MockObjectStore::new();
        let recipes = MockRecipeStore::new();
        let coordinator = coordinator(&objects, &recipes, Duration::from_secs(5));

        let gate = TaxonomyGate::new();
        let permit = gate.open().unwrap();

        let mut draft = bare_draft();
        draft.title.clear();

        let result = coordinator.publish(draft, permit).await;
        match result {
            SubmissionResult::Failure {
                error: PublishError::Validation(_),
            } => {}
            other => panic!("expected validation failure, got {other:?}"),
        }

        assert_eq!(objects.put_call_count(), 0);
        assert_eq!(recipes.insert_recipe_call_count(), 0);

        // The permit died with the attempt; the gate is armed again and a
        // late resolve finds nobody waiting.
        assert!(!gate.resolve(TaxonomySelection {
            category_id: 3,
            occasion_id: 7,
        }));
        assert!(gate.open().is_ok());
    }

    #[tokio::test]
    async fn recipe_insert_timeout_commits_nothing() {
        let objects = MockObjectStore::new();
        let recipes = MockRecipeStore::new();
        recipes.stall_recipe_inserts();
        let coordinator = coordinator(&objects, &recipes, Duration::from_millis(20));

        let gate = TaxonomyGate::new();
        let permit = gate.open().unwrap();
        gate.resolve(TaxonomySelection {
            category_id: 3,
            occasion_id: 7,
        });

        let result = coordinator.publish(bare_draft(), permit).await;
        match result {
            SubmissionResult::Failure {
                error: PublishError::RecipeInsert(_),
            } => {}
            other => panic!("expected recipe insert failure, got {other:?}"),
        }

        assert!(recipes.recipes().is_empty());
        assert_eq!(recipes.association_call_count(), 0);
    }
}

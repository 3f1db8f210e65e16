use ladle_core::RecipeId;

use crate::error::PublishError;

/// Terminal outcome of one submission attempt. Returned to the caller for
/// feedback and navigation; never persisted.
#[derive(Debug)]
pub enum SubmissionResult {
    /// Recipe row and every asset association committed.
    Success { recipe_id: RecipeId },

    /// Recipe row committed, but one or more associations failed. The recipe
    /// is visible to readers with fewer images than submitted; the listed
    /// slots are candidates for a caller-driven retry.
    PartialFailure {
        recipe_id: RecipeId,
        failed_slots: Vec<usize>,
    },

    /// Nothing was committed to the relational store.
    Failure { error: PublishError },
}

impl SubmissionResult {
    /// Identifier of the committed recipe, when one exists.
    pub fn recipe_id(&self) -> Option<RecipeId> {
        match self {
            Self::Success { recipe_id } | Self::PartialFailure { recipe_id, .. } => {
                Some(*recipe_id)
            }
            Self::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Where the coordinator stopped.
#[derive(Debug)]
pub(crate) enum Terminal {
    /// Phase B committed; `failed_slots` lists the associations that did not.
    Committed {
        recipe_id: RecipeId,
        failed_slots: Vec<usize>,
    },
    /// The attempt aborted before Phase B committed anything.
    Aborted(PublishError),
}

/// Pure mapping from the coordinator's terminal state to the caller-facing
/// result. Exhaustive over both terminal shapes; no side effects.
pub(crate) fn report(terminal: Terminal) -> SubmissionResult {
    match terminal {
        Terminal::Committed {
            recipe_id,
            failed_slots,
        } => {
            if failed_slots.is_empty() {
                SubmissionResult::Success { recipe_id }
            } else {
                SubmissionResult::PartialFailure {
                    recipe_id,
                    failed_slots,
                }
            }
        }
        Terminal::Aborted(error) => SubmissionResult::Failure { error },
    }
}

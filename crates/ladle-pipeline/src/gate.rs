//! One-shot taxonomy gate.
//!
//! A submission attempt opens the gate and suspends on the returned permit
//! until the selection surface delivers a (category, occasion) pair. The
//! sender half lives inside the gate state and is consumed by the first
//! delivery, so an attempt can never observe two resolutions: re-renders or
//! repeated confirmations of the selection surface become no-ops instead of
//! second pipeline runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::oneshot;

use ladle_core::TaxonomySelection;

/// Errors surfaced by the gate and its permit.
#[derive(Debug, Error)]
pub enum GateError {
    /// A previous attempt for this draft is still in flight.
    #[error("a submission attempt is already in flight for this draft")]
    AttemptInFlight,

    /// The selection surface went away without delivering a pair.
    #[error("taxonomy selection abandoned before a choice was made")]
    SelectionAbandoned,

    /// The permit's one delivery was already consumed.
    #[error("taxonomy selection already consumed for this attempt")]
    AlreadyConsumed,
}

enum GateState {
    /// No attempt in flight.
    Idle,
    /// An attempt holds a permit and waits on this sender's value.
    AwaitingSelection(oneshot::Sender<TaxonomySelection>),
    /// The selection was delivered (or abandoned); the attempt is running.
    Processing,
}

/// One-shot synchronization point between the selection surface and the
/// commit pipeline. Cheap to clone; clones share state. One gate guards one
/// draft.
#[derive(Clone)]
pub struct TaxonomyGate {
    state: Arc<Mutex<GateState>>,
}

impl TaxonomyGate {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GateState::Idle)),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        // Poison only marks a panicked peer; every stored state is valid.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the gate for one submission attempt.
    ///
    /// Fails with [`GateError::AttemptInFlight`] while a previous permit is
    /// alive, which is what bounds each draft to one coordinator run at a
    /// time.
    pub fn open(&self) -> Result<SubmissionPermit, GateError> {
        let mut state = self.lock_state();
        match *state {
            GateState::Idle => {
                let (tx, rx) = oneshot::channel();
                *state = GateState::AwaitingSelection(tx);
                Ok(SubmissionPermit {
                    rx: Some(rx),
                    state: Arc::clone(&self.state),
                })
            }
            GateState::AwaitingSelection(_) | GateState::Processing => {
                Err(GateError::AttemptInFlight)
            }
        }
    }

    /// Deliver the chosen pair to the waiting attempt.
    ///
    /// Returns true when an attempt consumed the delivery. Returns false and
    /// does nothing when no attempt is waiting, including when an earlier
    /// delivery already released the attempt, so repeated confirmation
    /// cannot start a second run.
    pub fn resolve(&self, selection: TaxonomySelection) -> bool {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, GateState::Processing) {
            GateState::AwaitingSelection(tx) => {
                // A send only fails if the permit was dropped mid-wait; the
                // gate still moves to Processing until that drop re-arms it.
                tx.send(selection).is_ok()
            }
            previous => {
                *state = previous;
                false
            }
        }
    }

    /// Abandon the waiting attempt (the selection surface was closed).
    ///
    /// Returns true when an attempt was waiting; that attempt observes
    /// [`GateError::SelectionAbandoned`].
    pub fn cancel(&self) -> bool {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, GateState::Processing) {
            GateState::AwaitingSelection(tx) => {
                drop(tx);
                true
            }
            previous => {
                *state = previous;
                false
            }
        }
    }
}

impl Default for TaxonomyGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability to run one submission attempt.
///
/// Holding the permit keeps the gate closed to further opens; dropping it,
/// after the attempt finishes or abandons, re-arms the gate.
pub struct SubmissionPermit {
    rx: Option<oneshot::Receiver<TaxonomySelection>>,
    state: Arc<Mutex<GateState>>,
}

impl SubmissionPermit {
    /// Wait for the frozen (category, occasion) pair of this attempt.
    ///
    /// Consumes the permit's one delivery: a second call reports
    /// [`GateError::AlreadyConsumed`] instead of ever yielding another pair.
    pub async fn selection(&mut self) -> Result<TaxonomySelection, GateError> {
        let rx = self.rx.take().ok_or(GateError::AlreadyConsumed)?;
        rx.await.map_err(|_| GateError::SelectionAbandoned)
    }
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = GateState::Idle;
    }
}

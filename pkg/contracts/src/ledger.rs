use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use parking_lot::RwLock;
use zk_circuits::{data::PublishedNote, Proof, ProofVerifier};
use zk_primitives::Commitment;

use crate::{Error, NoteState, Rejection, Result};

/// The ledger's view of notes: their states, the public record list and transfer verification
#[async_trait]
pub trait NoteLedger: Send + Sync {
    /// State of the note with this commitment, [`NoteState::Unknown`] if it was never created
    async fn note_state(&self, commitment: &Commitment) -> Result<NoteState>;

    /// Every published record, in the order they were appended
    async fn published_notes(&self) -> Result<Vec<PublishedNote>>;

    /// Verify a transfer proof and, if it holds, spend the old note and create the new ones
    ///
    /// Fails with [`Error::LedgerRejected`] if the proof is invalid, the old note isn't
    /// spendable or one of the new notes already exists.
    async fn verify_transfer(&self, proof: &Proof) -> Result<()>;

    /// Append a record to the published list
    async fn publish(&self, record: &PublishedNote) -> Result<()>;

    /// Create a note without a transfer, publishing its record
    async fn create_note(&self, commitment: &Commitment, record: &PublishedNote) -> Result<()>;
}

#[derive(Debug, Default)]
struct State {
    notes: HashMap<Commitment, NoteState>,
    published: Vec<PublishedNote>,
}

impl State {
    fn state(&self, commitment: &Commitment) -> NoteState {
        self.notes.get(commitment).copied().unwrap_or_default()
    }
}

/// A ledger held in memory, for tests and local simulation
///
/// Every state transition of a request happens under a single write lock, so concurrent
/// transfers spending the same note can't both succeed.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<State>>,
    verifier: Arc<dyn ProofVerifier>,
    pending_failures: Arc<AtomicUsize>,
    lost_receipts: Arc<AtomicUsize>,
    publish_failures: Arc<AtomicUsize>,
    verify_attempts: Arc<AtomicUsize>,
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryLedger")
            .field("notes", &state.notes.len())
            .field("published", &state.published.len())
            .finish_non_exhaustive()
    }
}

impl InMemoryLedger {
    pub fn new(verifier: impl ProofVerifier + 'static) -> Self {
        Self {
            state: Arc::default(),
            verifier: Arc::new(verifier),
            pending_failures: Arc::default(),
            lost_receipts: Arc::default(),
            publish_failures: Arc::default(),
            verify_attempts: Arc::default(),
        }
    }

    /// Make the next `n` requests fail with [`Error::Unavailable`]
    pub fn fail_next(&self, n: usize) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` accepted transfers fail with [`Error::Unavailable`] after their state
    /// change is applied, like a transaction mined after its receipt was lost
    pub fn lose_next_receipts(&self, n: usize) {
        self.lost_receipts.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls to [`NoteLedger::publish`] fail with [`Error::Unavailable`]
    pub fn fail_next_publishes(&self, n: usize) {
        self.publish_failures.store(n, Ordering::SeqCst);
    }

    /// Number of times [`NoteLedger::verify_transfer`] has been called, including failures
    pub fn verify_attempts(&self) -> usize {
        self.verify_attempts.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        take_failure(&self.pending_failures, "injected failure")
    }
}

fn take_failure(counter: &AtomicUsize, reason: &str) -> Result<()> {
    let failed = counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();

    if failed {
        Err(Error::Unavailable(reason.to_owned()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl NoteLedger for InMemoryLedger {
    async fn note_state(&self, commitment: &Commitment) -> Result<NoteState> {
        self.check_available()?;
        Ok(self.state.read().state(commitment))
    }

    async fn published_notes(&self) -> Result<Vec<PublishedNote>> {
        self.check_available()?;
        Ok(self.state.read().published.clone())
    }

    #[tracing::instrument(err, skip_all)]
    async fn verify_transfer(&self, proof: &Proof) -> Result<()> {
        self.verify_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let [old, new1, new2] = proof
            .transfer_commitments()
            .ok_or(Rejection::MalformedInputs)?;

        if !self.verifier.verify(proof) {
            return Err(Rejection::InvalidProof.into());
        }

        let mut state = self.state.write();

        let old_state = state.state(&old);
        if !old_state.can_become(NoteState::Spent) {
            return Err(Rejection::NotSpendable(old, old_state).into());
        }

        for new in [new1, new2] {
            if state.state(&new).is_known() {
                return Err(Rejection::NoteExists(new).into());
            }
        }
        if new1 == new2 {
            return Err(Rejection::NoteExists(new2).into());
        }

        state.notes.insert(old, NoteState::Spent);
        state.notes.insert(new1, NoteState::Created);
        state.notes.insert(new2, NoteState::Created);
        drop(state);

        tracing::info!(%old, %new1, %new2, "transfer verified");
        take_failure(&self.lost_receipts, "receipt lost")
    }

    async fn publish(&self, record: &PublishedNote) -> Result<()> {
        self.check_available()?;
        take_failure(&self.publish_failures, "injected publish failure")?;
        self.state.write().published.push(record.clone());
        Ok(())
    }

    async fn create_note(&self, commitment: &Commitment, record: &PublishedNote) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write();
        if state.state(commitment).is_known() {
            return Err(Rejection::NoteExists(*commitment).into());
        }

        state.notes.insert(*commitment, NoteState::Created);
        state.published.push(record.clone());

        tracing::info!(%commitment, "note created");
        Ok(())
    }
}

use std::collections::BTreeMap;

use contracts::{NoteLedger, NoteState, RetryPolicy};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use zk_circuits::data::{Amount, NoteOpening, OwnerId, PublishedNote};
use zk_primitives::Commitment;

use crate::Result;

/// A note found for an owner, with its state on the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OwnedNote {
    pub commitment: Commitment,
    pub state: NoteState,
    pub amount: Amount,
}

/// Totals over an owner's notes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// Sum of the notes that can still be spent
    pub available: Amount,
    /// Sum of the notes that have been spent
    pub spent: Amount,
}

/// One published record, opened if it is well formed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedEntry {
    pub record: PublishedNote,
    pub note: Option<OpenedRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenedRecord {
    pub commitment: Commitment,
    pub owner: OwnerId,
    pub amount: Amount,
}

impl Balance {
    #[must_use]
    pub fn from_notes(notes: &[OwnedNote]) -> Self {
        notes.iter().fold(Self::default(), |mut balance, note| {
            let total = match note.state {
                NoteState::Created => &mut balance.available,
                NoteState::Spent => &mut balance.spent,
                NoteState::Unknown => return balance,
            };
            *total = total.saturating_add(note.amount);
            balance
        })
    }
}

/// Reconstructs an owner's notes from the ledger's published records
///
/// Scanning is read-only and stateless: running it again over the same ledger gives the same
/// result.
#[derive(Debug, Clone)]
pub struct Scanner {
    concurrency: usize,
    retry: RetryPolicy,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Scanner {
    /// A scanner with at most `concurrency` state lookups in flight
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self { retry, ..self }
    }

    /// Fetch the published records and find the notes owned by `owner`
    #[tracing::instrument(err, skip(self, ledger))]
    pub async fn scan<L: NoteLedger + ?Sized>(
        &self,
        ledger: &L,
        owner: &OwnerId,
    ) -> Result<Vec<OwnedNote>> {
        let published = self.retry.run(|| ledger.published_notes()).await?;
        self.scan_records(ledger, &published, owner).await
    }

    /// Find the notes in `published` owned by `owner` that the ledger knows about
    ///
    /// Notes are returned ordered by commitment, each at most once. Records that can't be
    /// opened are skipped.
    pub async fn scan_records<L: NoteLedger + ?Sized>(
        &self,
        ledger: &L,
        published: &[PublishedNote],
        owner: &OwnerId,
    ) -> Result<Vec<OwnedNote>> {
        let candidates = published
            .iter()
            .filter(|record| record.is_owned_by(owner))
            .filter_map(|record| match record.open() {
                Ok((_, amount)) => {
                    let commitment = NoteOpening::new(*owner, amount).commitment();
                    Some((commitment, amount))
                }
                Err(err) => {
                    tracing::warn!(record = record.as_str(), %err, "skipping malformed record");
                    None
                }
            })
            .collect::<BTreeMap<_, _>>();

        tracing::debug!(
            records = published.len(),
            candidates = candidates.len(),
            "looking up note states"
        );

        let notes = stream::iter(candidates)
            .map(|(commitment, amount)| async move {
                let state = self.retry.run(|| ledger.note_state(&commitment)).await?;
                Ok::<_, crate::Error>(OwnedNote {
                    commitment,
                    state,
                    amount,
                })
            })
            .buffer_unordered(self.concurrency)
            .try_fold(BTreeMap::new(), |mut notes, note| async move {
                if note.state.is_known() {
                    notes.insert(note.commitment, note);
                }
                Ok(notes)
            })
            .await?;

        Ok(notes.into_values().collect())
    }

    /// Every published record, with the commitment it opens to
    pub async fn list_all<L: NoteLedger + ?Sized>(&self, ledger: &L) -> Result<Vec<PublishedEntry>> {
        let published = self.retry.run(|| ledger.published_notes()).await?;

        Ok(published
            .into_iter()
            .map(|record| {
                let note = match record.open() {
                    Ok((owner, amount)) => Some(OpenedRecord {
                        commitment: NoteOpening::new(owner, amount).commitment(),
                        owner,
                        amount,
                    }),
                    Err(err) => {
                        tracing::warn!(record = record.as_str(), %err, "malformed record");
                        None
                    }
                };

                PublishedEntry { record, note }
            })
            .collect())
    }
}

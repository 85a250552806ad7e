use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use contracts::{IsNetworkFailure, NoteLedger, NoteState, RetryPolicy};
use parking_lot::Mutex;
use serde::Serialize;
use zk_circuits::{
    assemble_transfer_witness,
    data::{Amount, Note, NoteOpening, OwnerId, PublishedNote, TransferRequest},
    relation::{NoteSlot, RelationDefinition},
    CompiledRelation, KeyMaterial, Proof, ProvingBackend,
};
use zk_primitives::Commitment;

use crate::{Error, Result};

type ProgramCache = Mutex<HashMap<(&'static str, u32), Arc<CompiledRelation>>>;

/// The result of a transfer the ledger accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    /// The note that was spent
    pub spent: Commitment,
    /// The note paid to the recipient
    pub sent: Commitment,
    /// The change note returned to the spender
    pub change: Commitment,
    pub proof: Proof,
}

/// Create a note owned by `owner` and publish its record
#[tracing::instrument(err, skip(ledger, retry))]
pub async fn mint<L: NoteLedger + ?Sized>(
    ledger: &L,
    retry: &RetryPolicy,
    owner: OwnerId,
    amount: Amount,
) -> Result<Note> {
    let note = Note::new(NoteOpening::new(owner, amount));
    let record = note.published()?;

    retry
        .run(|| ledger.create_note(&note.commitment, &record))
        .await?;

    tracing::info!(commitment = %note.commitment, "note minted");
    Ok(note)
}

/// Turns transfer requests into proofs and submits them to the ledger
pub struct TransferService<L> {
    backend: Arc<dyn ProvingBackend>,
    ledger: Arc<L>,
    proving_key: Arc<KeyMaterial>,
    retry: RetryPolicy,
    programs: Arc<ProgramCache>,
}

impl<L> std::fmt::Debug for TransferService<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferService")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<L: NoteLedger> TransferService<L> {
    pub fn new(
        backend: impl ProvingBackend + 'static,
        ledger: Arc<L>,
        proving_key: KeyMaterial,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            ledger,
            proving_key: Arc::new(proving_key),
            retry: RetryPolicy::default(),
            programs: Arc::default(),
        }
    }

    #[must_use]
    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self { retry, ..self }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Prove and submit a transfer, then publish the records of the two new notes
    ///
    /// Only network failures are retried. A rejected proof or an already spent note fails
    /// immediately, and the ledger is left unchanged. If the transfer is applied but its records
    /// can't be published, [`Error::RecordsPending`] carries the receipt and the records still to
    /// publish (see [`TransferService::republish`]).
    #[tracing::instrument(err, skip(self), fields(spender = %request.spender, recipient = %request.recipient))]
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt> {
        let witness = assemble_transfer_witness(request)?;

        // fail on unpublishable amounts before anything reaches the ledger
        let records = vec![
            witness.note(NoteSlot::New1).published()?,
            witness.note(NoteSlot::New2).published()?,
        ];

        let proof = self.prove(witness.relation(), witness.fields().to_vec()).await?;

        let commitments = witness.commitments();
        self.submit(&proof, &commitments).await?;

        let [spent, sent, change] = commitments;
        let receipt = TransferReceipt {
            spent,
            sent,
            change,
            proof,
        };

        // a retried publish may append a record twice, the scanner collapses duplicates
        for (i, record) in records.iter().enumerate() {
            if let Err(source) = self.retry.run(|| self.ledger.publish(record)).await {
                tracing::error!(%source, pending = records.len() - i, "transfer committed, records not published");
                return Err(Error::RecordsPending {
                    receipt: Box::new(receipt),
                    records: records[i..].to_vec(),
                    source,
                });
            }
        }

        tracing::info!(%spent, %sent, %change, "transfer complete");
        Ok(receipt)
    }

    /// Publish the records left over by a transfer that failed with [`Error::RecordsPending`]
    pub async fn republish(&self, records: &[PublishedNote]) -> Result<()> {
        for record in records {
            self.retry.run(|| self.ledger.publish(record)).await?;
        }

        Ok(())
    }

    /// Submit the proof, retrying network failures
    ///
    /// A submission can be applied by the ledger even though its response never arrives. When a
    /// retry after such a failure is rejected, the note states decide whether the earlier attempt
    /// went through.
    async fn submit(&self, proof: &Proof, commitments: &[Commitment; 3]) -> Result<()> {
        let interrupted = AtomicBool::new(false);
        let ledger = self.ledger.as_ref();
        let interrupted_ref = &interrupted;

        let result = self
            .retry
            .run(|| async move {
                let result = ledger.verify_transfer(proof).await;
                if matches!(&result, Err(err) if err.is_network_failure()) {
                    interrupted_ref.store(true, Ordering::SeqCst);
                }
                result
            })
            .await;

        match result {
            Err(contracts::Error::LedgerRejected(rejection))
                if interrupted.load(Ordering::SeqCst) =>
            {
                if self.is_applied(commitments).await? {
                    tracing::warn!(%rejection, "earlier submission was applied");
                    Ok(())
                } else {
                    Err(contracts::Error::LedgerRejected(rejection).into())
                }
            }
            result => Ok(result?),
        }
    }

    /// Whether the ledger shows the old note spent and both new notes created
    async fn is_applied(&self, [old, new1, new2]: &[Commitment; 3]) -> Result<bool> {
        for (commitment, expected) in [
            (old, NoteState::Spent),
            (new1, NoteState::Created),
            (new2, NoteState::Created),
        ] {
            let state = self
                .retry
                .run(|| self.ledger.note_state(commitment))
                .await?;

            if state != expected {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Create a new note on the ledger without a transfer
    pub async fn mint(&self, owner: OwnerId, amount: Amount) -> Result<Note> {
        mint(self.ledger.as_ref(), &self.retry, owner, amount).await
    }

    /// Compile (once per relation), execute and prove on a blocking thread
    async fn prove(
        &self,
        relation: &'static RelationDefinition,
        fields: Vec<zk_primitives::Element>,
    ) -> Result<Proof> {
        let backend = Arc::clone(&self.backend);
        let proving_key = Arc::clone(&self.proving_key);
        let programs = Arc::clone(&self.programs);

        let proof = tokio::task::spawn_blocking(move || -> zk_circuits::Result<Proof> {
            let compiled = {
                let mut programs = programs.lock();
                match programs.get(&(relation.name, relation.version)) {
                    Some(compiled) => Arc::clone(compiled),
                    None => {
                        tracing::debug!(relation = relation.name, version = relation.version, "compiling");
                        let compiled = Arc::new(backend.compile(relation)?);
                        programs.insert((relation.name, relation.version), Arc::clone(&compiled));
                        compiled
                    }
                }
            };

            let (trace, output) = backend.compute_witness(&compiled, &fields)?;
            tracing::debug!(%output, "witness computed");

            backend.generate_proof(&compiled.program, &trace, &proving_key)
        })
        .await??;

        Ok(proof)
    }
}

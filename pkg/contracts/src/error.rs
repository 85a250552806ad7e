use ethereum_types::{H256, U256};
use zk_primitives::Commitment;

use crate::NoteState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ledger rejected the request: {0}")]
    LedgerRejected(#[from] Rejection),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("unknown transaction: {0}")]
    UnknownTransaction(H256),

    #[error("ledger returned an invalid note state: {0}")]
    InvalidNoteState(U256),

    #[error("no signer configured for contract calls")]
    MissingSigner,

    #[error("web3 error")]
    Web3(#[from] web3::Error),

    #[error("web3 contract error")]
    Web3Contract(#[from] web3::contract::Error),

    #[error("serde_json error")]
    SerdeJson(#[from] serde_json::Error),

    #[error("from hex error")]
    FromHex(#[from] rustc_hex::FromHexError),

    #[error("tokio task join error")]
    TokioJoin(#[from] tokio::task::JoinError),
}

/// A deterministic refusal by the ledger: retrying the same request gives the same answer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("proof failed verification")]
    InvalidProof,

    #[error("proof inputs are not three commitments")]
    MalformedInputs,

    #[error("note {0} cannot be spent, its state is {1}")]
    NotSpendable(Commitment, NoteState),

    #[error("note {0} already exists")]
    NoteExists(Commitment),

    #[error("transaction reverted: {0}")]
    Reverted(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

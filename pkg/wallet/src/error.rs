use std::fmt;

use contracts::IsNetworkFailure;
use zk_circuits::data::PublishedNote;

use crate::TransferReceipt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("circuit error: {0}")]
    Circuits(#[from] zk_circuits::Error),

    #[error("ledger error: {0}")]
    Ledger(#[from] contracts::Error),

    /// The transfer is on the ledger, but these records of its new notes were not published
    #[error("transfer committed but {} record(s) were not published: {source}", .records.len())]
    RecordsPending {
        receipt: Box<TransferReceipt>,
        records: Vec<PublishedNote>,
        source: contracts::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("tokio task join error")]
    TokioJoin(#[from] tokio::task::JoinError),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<zk_primitives::Error> for Error {
    fn from(err: zk_primitives::Error) -> Self {
        Self::Circuits(err.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What a failed request means for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The request itself is invalid and can be fixed client side
    Malformed,
    /// The proof or the ledger refused the transfer, it did not happen and funds are unaffected
    Rejected,
    /// The ledger or a backend couldn't be reached, the same request may succeed later
    Network,
    /// The transfer happened but the records of its new notes still need to be published
    Incomplete,
}

impl FailureKind {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Malformed => "the request is malformed",
            Self::Rejected => "the transfer was rejected and did not happen, funds are unaffected",
            Self::Network => "network problem, retry later",
            Self::Incomplete => {
                "the transfer happened but its note records were not published, republish them"
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Circuits(err) => match err {
                zk_circuits::Error::RelationUnsatisfied | zk_circuits::Error::Backend(_) => {
                    FailureKind::Rejected
                }
                _ => FailureKind::Malformed,
            },
            Error::RecordsPending { .. } => FailureKind::Incomplete,
            Error::Ledger(err) if err.is_network_failure() => FailureKind::Network,
            Error::Ledger(
                contracts::Error::MissingSigner
                | contracts::Error::SerdeJson(_)
                | contracts::Error::FromHex(_),
            ) => FailureKind::Malformed,
            Error::Ledger(_) | Error::TokioJoin(_) => FailureKind::Rejected,
            Error::Config(_) | Error::Logging(_) => FailureKind::Malformed,
        }
    }
}

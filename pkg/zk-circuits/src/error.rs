use crate::data::Amount;

/// An error produced by zk-circuits
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value didn't fit the width it was being encoded into
    #[error("encoding error: {0}")]
    Encoding(#[from] zk_primitives::Error),

    /// The amount being sent is larger than the note being spent
    #[error("cannot send {send} from a note worth {spend}")]
    NegativeChange {
        /// Value of the note being spent
        spend: Amount,
        /// Value being sent to the recipient
        send: Amount,
    },

    /// An owner identifier could not be parsed
    #[error("invalid owner: {0}")]
    InvalidOwner(String),

    /// An amount could not be parsed
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A published note record could not be opened
    #[error("malformed published note: {0}")]
    MalformedRecord(String),

    /// The relation does not hold for the given inputs
    #[error("relation unsatisfied")]
    RelationUnsatisfied,

    /// Two fields that the relation declares as shared held different values
    #[error("shared field group {0} has mismatched values")]
    SharedFieldMismatch(&'static str),

    /// No relation is registered under this name and version
    #[error("unknown relation {name} v{version}")]
    UnknownRelation {
        /// Name that was looked up
        name: String,
        /// Version that was looked up
        version: u32,
    },

    /// A field vector didn't match the length of the relation's signature
    #[error("expected {expected} fields, got {actual}")]
    WitnessLength {
        /// Length of the declared signature
        expected: usize,
        /// Length of the vector that was provided
        actual: usize,
    },

    /// Key material could not be read
    #[error("failed to load {purpose} key: {source}")]
    Key {
        /// Which key was being loaded
        purpose: crate::KeyPurpose,
        /// The underlying io error
        source: std::io::Error,
    },

    /// The proving backend failed for a reason other than an unsatisfied relation
    #[error("proving backend error: {0}")]
    Backend(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

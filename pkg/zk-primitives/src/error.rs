/// An error produced while encoding or committing to note data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The value needs more bytes than the declared width
    #[error("value needs {required} bytes but the encoding width is {width}")]
    EncodingOverflow {
        /// The declared width of the encoding
        width: usize,
        /// The number of significant bytes in the value
        required: usize,
    },

    /// A byte string passed to the commitment function had the wrong length
    #[error("expected {expected} bytes, got {actual}")]
    InvalidInputWidth {
        /// The width the function requires
        expected: usize,
        /// The width that was provided
        actual: usize,
    },

    /// A hex string could not be decoded
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Shorthand for results with [`enum@Error`]
pub type Result<T, E = Error> = core::result::Result<T, E>;

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Core primitives for the note transfer relation: field elements, fixed-width encodings and the
//! SHA-256 note commitment

mod commitment;
mod element;
mod encode;
mod error;

pub use commitment::{commit, join, split, Commitment, OpeningFields, HALF_WIDTH};
pub use element::Element;
pub use encode::{encode, encode_into, BeBytes, Encoded, COMMITMENT_WIDTH, LEGACY_WIDTH};
pub use error::{Error, Result};

//! Wallet side of confidential note transfers: scanning the ledger for an owner's notes and
//! turning transfer requests into proofs the ledger accepts

pub mod config;
mod error;
pub mod logging;
mod scan;
mod service;

pub use config::Config;
pub use error::{Error, FailureKind, Result};
pub use scan::{Balance, OpenedRecord, OwnedNote, PublishedEntry, Scanner};
pub use service::{mint, TransferReceipt, TransferService};

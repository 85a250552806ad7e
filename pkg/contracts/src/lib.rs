#![deny(clippy::disallowed_methods)]

mod client;
mod error;
mod ledger;
mod notes;
mod retry;
mod state;
pub mod util;

pub use client::Client;
pub use error::{Error, Rejection, Result};
pub use ledger::{InMemoryLedger, NoteLedger};
pub use notes::NoteContract;
pub use retry::{IsNetworkFailure, RetryPolicy};
pub use state::NoteState;

pub use web3::{
    signing::SecretKey,
    types::{Address, H256, U256},
};

//! Helpers for exercising the transfer pipeline without a real proving system

mod backend;

pub use backend::{test_keys, TestBackend, TestVerifier};

use crate::data::OwnerId;

/// The spender used throughout the tests
#[must_use]
pub fn alice() -> OwnerId {
    "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4".parse().unwrap()
}

/// The recipient used throughout the tests
#[must_use]
pub fn bob() -> OwnerId {
    "0xAb8483F64d9C6d1EcF9b849Ae677dD3315835cb2".parse().unwrap()
}

/// An owner that neither sends nor receives
#[must_use]
pub fn carol() -> OwnerId {
    "0x4fdd54a50623a7c7b5b3055700eb4872356bd5b3".parse().unwrap()
}

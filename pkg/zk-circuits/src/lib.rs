#![deny(clippy::disallowed_methods)]

pub mod constants;
mod keys;
mod note;
pub mod proof;
pub mod relation;
mod witness;

mod error;

#[cfg(feature = "test")]
pub mod test;

/// Simple data types used as inputs to the proofs
pub mod data;

pub use constants::{TRANSFER_FIELDS, TRANSFER_PRIVATE_INPUTS, TRANSFER_PUBLIC_INPUTS};
pub use keys::{KeyMaterial, KeyPurpose};
pub use note::NoteFields;
pub use proof::{CompiledRelation, Program, Proof, ProofVerifier, ProvingBackend, WitnessTrace};
pub use relation::RelationDefinition;
pub use witness::{assemble_transfer_witness, assemble_witness, TransferWitness};

pub use error::{Error, Result};
pub use zk_primitives::{Commitment, Element};

use serde::{Deserialize, Serialize};
use zk_primitives::{Commitment, Element};

use crate::{relation::RelationDefinition, KeyMaterial, Result};

/// A relation compiled by a proving backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub version: u32,
    /// Backend specific program bytes, opaque to this crate
    #[serde(with = "hex")]
    pub bytecode: Vec<u8>,
}

/// A relation definition paired with the program a backend compiled from its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRelation {
    pub definition: &'static RelationDefinition,
    pub program: Program,
}

/// Every intermediate value the backend computed while executing a program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessTrace(pub Vec<Element>);

/// A proof together with the inputs it was produced for
///
/// `inputs` holds the relation's public inputs in signature order, followed by the program's
/// output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "hex")]
    pub data: Vec<u8>,
    pub inputs: Vec<Element>,
}

impl std::fmt::Debug for Proof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proof")
            .field("data", &hex::encode(&self.data))
            .field("inputs", &self.inputs)
            .finish()
    }
}

impl Proof {
    #[must_use]
    pub fn new(data: Vec<u8>, inputs: Vec<Element>) -> Self {
        Self { data, inputs }
    }

    /// The public inputs, without the trailing output
    #[must_use]
    pub fn public_inputs(&self) -> &[Element] {
        self.inputs.split_last().map_or(&[], |(_, public)| public)
    }

    /// The value the program returned
    #[must_use]
    pub fn output(&self) -> Option<Element> {
        self.inputs.last().copied()
    }

    /// The old, recipient and change commitments a transfer proof attests to
    ///
    /// Returns `None` if the public inputs aren't exactly three pairs of commitment halves.
    #[must_use]
    pub fn transfer_commitments(&self) -> Option<[Commitment; 3]> {
        let [old_hi, old_lo, new1_hi, new1_lo, new2_hi, new2_lo] = *self.public_inputs() else {
            return None;
        };

        Some([
            Commitment::from_halves(old_hi, old_lo)?,
            Commitment::from_halves(new1_hi, new1_lo)?,
            Commitment::from_halves(new2_hi, new2_lo)?,
        ])
    }
}

/// The compile, execute and prove steps of a proving system
///
/// Implementations are expected to be CPU heavy, callers on an async runtime should run them
/// on a blocking thread.
pub trait ProvingBackend: Send + Sync {
    /// Compile a relation's source into a program
    fn compile(&self, relation: &'static RelationDefinition) -> Result<CompiledRelation>;

    /// Execute the program over `fields`, which must follow the relation's signature
    ///
    /// Fails with [`Error::RelationUnsatisfied`](crate::Error::RelationUnsatisfied) if the
    /// relation doesn't hold.
    fn compute_witness(
        &self,
        relation: &CompiledRelation,
        fields: &[Element],
    ) -> Result<(WitnessTrace, Element)>;

    /// Produce a proof for an executed program
    fn generate_proof(
        &self,
        program: &Program,
        trace: &WitnessTrace,
        proving_key: &KeyMaterial,
    ) -> Result<Proof>;
}

/// Checks proofs against a verification key it holds
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, proof: &Proof) -> bool;
}

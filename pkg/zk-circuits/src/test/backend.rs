use sha2::{Digest, Sha256};
use zk_primitives::Element;

use crate::{
    proof::{CompiledRelation, Program, Proof, ProofVerifier, ProvingBackend, WitnessTrace},
    relation::RelationDefinition,
    Error, KeyMaterial, Result,
};

/// A transparent stand-in for a proving system
///
/// The relation is evaluated natively and the "proof" is `SHA256(key || inputs)`. This reveals
/// nothing about the witness but proves nothing either: anyone holding the key can forge a
/// proof. Proving and verification keys from [`test_keys`] are the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestBackend;

/// Checks proofs produced by [`TestBackend`]
#[derive(Debug, Clone)]
pub struct TestVerifier {
    verification_key: KeyMaterial,
}

/// A matching proving and verification key pair for [`TestBackend`]
#[must_use]
pub fn test_keys() -> (KeyMaterial, KeyMaterial) {
    let key = KeyMaterial::new(b"test transfer key".to_vec());
    (key.clone(), key)
}

fn seal(key: &KeyMaterial, inputs: &[Element]) -> Vec<u8> {
    inputs
        .iter()
        .fold(Sha256::new().chain_update(key.as_bytes()), |hasher, input| {
            hasher.chain_update(input.to_be_bytes())
        })
        .finalize()
        .to_vec()
}

impl ProvingBackend for TestBackend {
    fn compile(&self, relation: &'static RelationDefinition) -> Result<CompiledRelation> {
        let bytecode = Sha256::digest(relation.source.as_bytes()).to_vec();

        Ok(CompiledRelation {
            definition: relation,
            program: Program {
                name: relation.name.to_owned(),
                version: relation.version,
                bytecode,
            },
        })
    }

    fn compute_witness(
        &self,
        relation: &CompiledRelation,
        fields: &[Element],
    ) -> Result<(WitnessTrace, Element)> {
        if !relation.definition.is_satisfied(fields)? {
            return Err(Error::RelationUnsatisfied);
        }

        let output = Element::ONE;
        let mut trace = fields.to_vec();
        trace.push(output);

        Ok((WitnessTrace(trace), output))
    }

    fn generate_proof(
        &self,
        program: &Program,
        trace: &WitnessTrace,
        proving_key: &KeyMaterial,
    ) -> Result<Proof> {
        let relation = RelationDefinition::lookup(&program.name, program.version)?;

        let Some((output, fields)) = trace.0.split_last() else {
            return Err(Error::Backend("empty witness trace".to_owned()));
        };
        relation.check_len(fields)?;

        let mut inputs = relation
            .public_positions()
            .map(|i| fields[i])
            .collect::<Vec<_>>();
        inputs.push(*output);

        Ok(Proof {
            data: seal(proving_key, &inputs),
            inputs,
        })
    }
}

impl TestVerifier {
    #[must_use]
    pub fn new(verification_key: KeyMaterial) -> Self {
        Self { verification_key }
    }
}

impl Default for TestVerifier {
    fn default() -> Self {
        Self::new(test_keys().1)
    }
}

impl ProofVerifier for TestVerifier {
    fn verify(&self, proof: &Proof) -> bool {
        proof.output() == Some(Element::ONE)
            && proof.data == seal(&self.verification_key, &proof.inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assemble_transfer_witness,
        data::TransferRequest,
        relation::TRANSFER_V1,
        test::{alice, bob},
    };

    fn prove(request: &TransferRequest) -> Result<Proof> {
        let backend = TestBackend;
        let witness = assemble_transfer_witness(request)?;
        let compiled = backend.compile(&TRANSFER_V1)?;
        let (trace, _) = backend.compute_witness(&compiled, witness.fields())?;
        backend.generate_proof(&compiled.program, &trace, &test_keys().0)
    }

    #[test]
    fn proof_carries_public_inputs_and_output() {
        let request = TransferRequest::new(alice(), 5u64, bob(), 1u64);
        let witness = assemble_transfer_witness(&request).unwrap();
        let proof = prove(&request).unwrap();

        assert_eq!(proof.public_inputs(), witness.public_inputs());
        assert_eq!(proof.output(), Some(Element::ONE));
        assert_eq!(proof.transfer_commitments(), Some(witness.commitments()));
        assert!(TestVerifier::default().verify(&proof));
    }

    #[test]
    fn unsatisfied_relation_has_no_trace() {
        let request = TransferRequest::new(alice(), 5u64, bob(), 1u64);
        let mut fields = assemble_transfer_witness(&request).unwrap().into_fields();
        fields[15] = Element::from(5u64);

        let backend = TestBackend;
        let compiled = backend.compile(&TRANSFER_V1).unwrap();

        assert!(matches!(
            backend.compute_witness(&compiled, &fields),
            Err(Error::RelationUnsatisfied)
        ));
    }

    #[test]
    fn tampered_proofs_fail_verification() {
        let proof = prove(&TransferRequest::new(alice(), 5u64, bob(), 1u64)).unwrap();
        let verifier = TestVerifier::default();

        let mut inputs = proof.clone();
        inputs.inputs[0] = inputs.inputs[0] + 1u64;
        assert!(!verifier.verify(&inputs));

        let mut data = proof.clone();
        data.data[0] ^= 1;
        assert!(!verifier.verify(&data));

        let other_key = TestVerifier::new(KeyMaterial::new(b"another key".to_vec()));
        assert!(!other_key.verify(&proof));
    }

    #[test]
    fn compile_is_deterministic() {
        let a = TestBackend.compile(&TRANSFER_V1).unwrap();
        let b = TestBackend.compile(&TRANSFER_V1).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.program.name, "transfer");
        assert_eq!(a.program.version, 1);
    }
}

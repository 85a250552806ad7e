use std::time::Duration;

use async_trait::async_trait;
use ethereum_types::{H256, U256};
use web3::{
    contract::{tokens::Tokenize, Contract},
    ethabi::Token,
    signing::{Key, SecretKey, SecretKeyRef},
    transports::Http,
    types::{Address, Bytes},
};
use zk_circuits::{data::PublishedNote, Proof};
use zk_primitives::Commitment;

use crate::{
    util::{convert_commitment_to_h256, convert_element_to_u256},
    Client, Error, NoteLedger, NoteState, Result,
};

pub(crate) const CONTRACT_JSON: &str = include_str!("abi/SecretNote.json");

/// The ledger contract that stores note states and the published note list
#[derive(Clone, Debug)]
pub struct NoteContract {
    client: Client,
    contract: Contract<Http>,
    signer: Option<(SecretKey, Address)>,
    address: Address,
    confirm_interval: Duration,
}

impl NoteContract {
    pub fn new(client: Client, contract: Contract<Http>, address: Address) -> Self {
        Self {
            client,
            contract,
            signer: None,
            address,
            confirm_interval: Duration::from_secs(1),
        }
    }

    /// Load the contract at `address` for reading only
    pub fn load(client: Client, address: &str) -> Result<Self> {
        let contract = client.load_contract_from_str(address, CONTRACT_JSON)?;
        let address = contract.address();
        Ok(Self::new(client, contract, address))
    }

    /// Sign transactions with `signer`, required for every call that changes the ledger
    #[must_use]
    pub fn with_signer(self, signer: SecretKey) -> Self {
        let signer_address = Key::address(&SecretKeyRef::new(&signer));
        Self {
            signer: Some((signer, signer_address)),
            ..self
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Send a signed call and wait until it is mined without reverting
    pub async fn call(&self, func: &str, params: impl Tokenize + Clone) -> Result<H256> {
        let (signer, signer_address) = self.signer.as_ref().ok_or(Error::MissingSigner)?;

        let txn = self
            .client
            .call(&self.contract, func, params, signer, *signer_address)
            .await?;
        self.client
            .wait_for_success(txn, self.confirm_interval)
            .await?;

        Ok(txn)
    }

    #[tracing::instrument(err, ret, skip(self))]
    pub async fn notes_len(&self) -> Result<u64> {
        let len: U256 = self
            .client
            .query(
                &self.contract,
                "getNotesLength",
                (),
                None,
                Default::default(),
                None,
            )
            .await?;

        Ok(len.low_u64())
    }

    #[tracing::instrument(err, skip(self))]
    pub async fn published_note(&self, index: u64) -> Result<PublishedNote> {
        let record: String = self
            .client
            .query(
                &self.contract,
                "allNotes",
                (U256::from(index),),
                None,
                Default::default(),
                None,
            )
            .await?;

        Ok(PublishedNote(record))
    }
}

fn decode_state(raw: U256) -> Result<NoteState> {
    if raw.bits() > 8 {
        return Err(Error::InvalidNoteState(raw));
    }

    u8::try_from(raw.low_u64())
        .ok()
        .and_then(|state| NoteState::try_from(state).ok())
        .ok_or(Error::InvalidNoteState(raw))
}

#[async_trait]
impl NoteLedger for NoteContract {
    #[tracing::instrument(err, ret, skip(self))]
    async fn note_state(&self, commitment: &Commitment) -> Result<NoteState> {
        let state: U256 = self
            .client
            .query(
                &self.contract,
                "notes",
                (convert_commitment_to_h256(commitment),),
                None,
                Default::default(),
                None,
            )
            .await?;

        decode_state(state)
    }

    async fn published_notes(&self) -> Result<Vec<PublishedNote>> {
        let len = self.notes_len().await?;

        let mut records = Vec::new();
        for index in 0..len {
            records.push(self.published_note(index).await?);
        }

        Ok(records)
    }

    #[tracing::instrument(err, skip_all)]
    async fn verify_transfer(&self, proof: &Proof) -> Result<()> {
        let inputs = proof
            .inputs
            .iter()
            .map(|input| Token::Uint(convert_element_to_u256(input)))
            .collect::<Vec<_>>();

        let txn = self
            .call(
                "verifyTx",
                (Bytes::from(proof.data.clone()), Token::Array(inputs)),
            )
            .await?;

        tracing::info!(?txn, "transfer verified");
        Ok(())
    }

    #[tracing::instrument(err, skip(self))]
    async fn publish(&self, record: &PublishedNote) -> Result<()> {
        self.call("publishNote", (record.0.clone(),)).await?;
        Ok(())
    }

    #[tracing::instrument(err, skip(self))]
    async fn create_note(&self, commitment: &Commitment, record: &PublishedNote) -> Result<()> {
        self.call(
            "createNote",
            (convert_commitment_to_h256(commitment), record.0.clone()),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_states_from_the_contract() {
        assert_eq!(decode_state(U256::from(0)).unwrap(), NoteState::Unknown);
        assert_eq!(decode_state(U256::from(1)).unwrap(), NoteState::Created);
        assert_eq!(decode_state(U256::from(2)).unwrap(), NoteState::Spent);

        assert!(matches!(
            decode_state(U256::from(3)),
            Err(Error::InvalidNoteState(_))
        ));
        assert!(matches!(
            decode_state(U256::from(257)),
            Err(Error::InvalidNoteState(_))
        ));
    }

    #[tokio::test]
    async fn writes_need_a_signer() {
        let client = Client::new("http://localhost:8545", None).unwrap();
        let contract =
            NoteContract::load(client, "0x9e5dBfF85B525e82C40B8D8D41fcA1ae27ACAc6E").unwrap();

        let record = PublishedNote("00".repeat(32));
        assert!(matches!(
            contract.publish(&record).await,
            Err(Error::MissingSigner)
        ));
    }
}

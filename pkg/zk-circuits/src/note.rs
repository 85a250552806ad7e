use zk_primitives::{
    commit, encode, split, Commitment, Element, Encoded, OpeningFields, COMMITMENT_WIDTH,
    LEGACY_WIDTH,
};

use crate::{
    constants::OWNER_WIDTH,
    data::{Amount, Note, NoteOpening, OwnerId, PublishedNote},
    relation::FieldRole,
    Error, Result,
};

impl OwnerId {
    /// The canonical 32-byte encoding hashed into commitments (left zero padded)
    #[must_use]
    pub fn encode(&self) -> Encoded<COMMITMENT_WIDTH> {
        // 20 bytes always fit in 32
        #[allow(clippy::expect_used)]
        let encoded = encode::<COMMITMENT_WIDTH, _>(&self.0).expect("owner fits in commitment width");
        encoded
    }
}

impl Amount {
    /// The 32-byte big-endian encoding hashed into commitments
    #[must_use]
    pub fn encode(&self) -> Encoded<COMMITMENT_WIDTH> {
        // a U256 always fits in 32 bytes
        #[allow(clippy::expect_used)]
        let encoded = encode::<COMMITMENT_WIDTH, _>(&self.0).expect("amount fits in commitment width");
        encoded
    }

    /// The 12-byte encoding used only by [`PublishedNote`] records
    pub fn encode_legacy(&self) -> Result<Encoded<LEGACY_WIDTH>> {
        Ok(encode::<LEGACY_WIDTH, _>(&self.0)?)
    }
}

impl NoteOpening {
    pub fn new(owner: OwnerId, amount: impl Into<Amount>) -> Self {
        Self {
            owner,
            amount: amount.into(),
        }
    }

    /// Hash/commitment for the note
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        let owner = self.owner.encode();
        let amount = self.amount.encode();

        // both encodings are exactly 32 bytes
        #[allow(clippy::expect_used)]
        let commitment =
            commit(owner.as_bytes(), amount.as_bytes()).expect("encodings have commitment width");
        commitment
    }

    /// The private opening split into its four 16-byte halves
    #[must_use]
    pub fn split(&self) -> OpeningFields {
        let owner = self.owner.encode();
        let amount = self.amount.encode();

        #[allow(clippy::expect_used)]
        let fields =
            split(owner.as_bytes(), amount.as_bytes()).expect("encodings have commitment width");
        fields
    }
}

impl Note {
    /// Build a note from its opening, computing the commitment
    #[must_use]
    pub fn new(opening: NoteOpening) -> Self {
        Self {
            commitment: opening.commitment(),
            opening,
        }
    }

    /// Every field the relation may reference for this note, as field elements
    #[must_use]
    pub fn fields(&self) -> NoteFields {
        let OpeningFields {
            owner_hi,
            owner_lo,
            amount_hi,
            amount_lo,
        } = self.opening.split();

        NoteFields {
            hash_hi: self.commitment.hash_hi(),
            hash_lo: self.commitment.hash_lo(),
            owner_hi: owner_hi.into(),
            owner_lo: owner_lo.into(),
            amount_hi: amount_hi.into(),
            amount_lo: amount_lo.into(),
        }
    }

    /// The record to publish alongside this note's commitment
    pub fn published(&self) -> Result<PublishedNote> {
        PublishedNote::new(self.opening.owner, self.opening.amount)
    }
}

/// All six relation fields of one note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteFields {
    pub hash_hi: Element,
    pub hash_lo: Element,
    pub owner_hi: Element,
    pub owner_lo: Element,
    pub amount_hi: Element,
    pub amount_lo: Element,
}

impl NoteFields {
    #[must_use]
    pub fn get(&self, role: FieldRole) -> Element {
        match role {
            FieldRole::HashHi => self.hash_hi,
            FieldRole::HashLo => self.hash_lo,
            FieldRole::OwnerHi => self.owner_hi,
            FieldRole::OwnerLo => self.owner_lo,
            FieldRole::AmountHi => self.amount_hi,
            FieldRole::AmountLo => self.amount_lo,
        }
    }
}

/// Number of hex characters of the owner at the start of a record
const OWNER_HEX_LEN: usize = OWNER_WIDTH * 2;

impl PublishedNote {
    /// Build the record for a note owned by `owner` worth `amount`
    ///
    /// Fails if `amount` doesn't fit in the 12-byte record encoding
    pub fn new(owner: OwnerId, amount: Amount) -> Result<Self> {
        let amount = amount.encode_legacy()?;
        Ok(Self(format!("{}{}", owner.to_hex(), amount.to_hex())))
    }

    /// The raw record text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the owner and amount written into this record
    ///
    /// The owner is the first 40 hex characters, the amount is whatever follows. The owner is
    /// returned as written (the comparison with a candidate owner is case-insensitive).
    pub fn open(&self) -> Result<(OwnerId, Amount)> {
        let record = self.0.strip_prefix("0x").unwrap_or(&self.0);

        if record.len() <= OWNER_HEX_LEN || !record.is_char_boundary(OWNER_HEX_LEN) {
            return Err(Error::MalformedRecord(self.0.clone()));
        }

        let (owner, amount) = record.split_at(OWNER_HEX_LEN);

        let owner = owner
            .parse()
            .map_err(|_| Error::MalformedRecord(self.0.clone()))?;
        let amount = ethnum::U256::from_str_radix(amount, 16)
            .map_err(|_| Error::MalformedRecord(self.0.clone()))?;

        Ok((owner, Amount(amount)))
    }

    /// Whether the owner in this record is `owner`, compared case-insensitively
    #[must_use]
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        let record = self.0.strip_prefix("0x").unwrap_or(&self.0);

        record
            .get(..OWNER_HEX_LEN)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(&owner.to_hex()))
    }
}

impl From<String> for PublishedNote {
    fn from(value: String) -> Self {
        Self(value)
    }
}

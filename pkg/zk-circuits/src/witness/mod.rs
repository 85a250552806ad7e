use zk_primitives::{encode_into, Commitment, Element, HALF_WIDTH};

use crate::{
    data::{Note, NoteOpening, TransferRequest},
    note::NoteFields,
    relation::{FieldRef, NoteSlot, RelationDefinition, TRANSFER_V1},
    Error, Result,
};

#[cfg(test)]
mod tests;

/// The ordered inputs for one transfer, laid out exactly as the relation's signature declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferWitness {
    relation: &'static RelationDefinition,
    notes: [Note; 3],
    fields: Vec<Element>,
}

/// Build the witness for `request` against the current transfer relation
pub fn assemble_transfer_witness(request: &TransferRequest) -> Result<TransferWitness> {
    assemble_witness(&TRANSFER_V1, request)
}

/// Build the witness for `request` against a specific relation version
///
/// The three notes are:
///  - old: the spender's note worth `spend_amount`
///  - new1: the recipient's note worth `send_amount`
///  - new2: the change, owned by the spender
pub fn assemble_witness(
    relation: &'static RelationDefinition,
    request: &TransferRequest,
) -> Result<TransferWitness> {
    let change = request.change()?;

    // conservation is only enforced over the low half of each amount
    for amount in [request.spend_amount, request.send_amount, change] {
        encode_into(&amount.to_u256(), HALF_WIDTH)?;
    }

    let notes = [
        Note::new(NoteOpening::new(request.spender, request.spend_amount)),
        Note::new(NoteOpening::new(request.recipient, request.send_amount)),
        Note::new(NoteOpening::new(request.spender, change)),
    ];
    let note_fields: Vec<NoteFields> = notes.iter().map(Note::fields).collect();

    for group in relation.shared {
        let source = &note_fields[group.source.index()];
        let target = &note_fields[group.target.index()];

        if group.roles.iter().any(|role| source.get(*role) != target.get(*role)) {
            return Err(Error::SharedFieldMismatch(group.name));
        }
    }

    let fields = relation
        .signature
        .iter()
        .map(|spec| note_fields[spec.field.note.index()].get(spec.field.role))
        .collect::<Vec<_>>();

    tracing::debug!(
        relation = relation.name,
        version = relation.version,
        old = %notes[0].commitment,
        new1 = %notes[1].commitment,
        new2 = %notes[2].commitment,
        "assembled transfer witness"
    );

    Ok(TransferWitness {
        relation,
        notes,
        fields,
    })
}

impl TransferWitness {
    /// The relation this witness was laid out for
    #[must_use]
    pub fn relation(&self) -> &'static RelationDefinition {
        self.relation
    }

    /// Every input, public and private, in signature order
    #[must_use]
    pub fn fields(&self) -> &[Element] {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<Element> {
        self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The value of one note field, following shared groups for fields that aren't inputs of
    /// their own
    #[must_use]
    pub fn field(&self, field: FieldRef) -> Option<Element> {
        self.relation
            .resolve(field)
            .and_then(|i| self.fields.get(i))
            .copied()
    }

    /// The public inputs, in signature order
    #[must_use]
    pub fn public_inputs(&self) -> Vec<Element> {
        self.relation
            .public_positions()
            .map(|i| self.fields[i])
            .collect()
    }

    /// Every input rendered in base 10, ready for the proving backend
    #[must_use]
    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.to_decimal()).collect()
    }

    #[must_use]
    pub fn note(&self, slot: NoteSlot) -> &Note {
        &self.notes[slot.index()]
    }

    /// Commitments of the spent, recipient and change notes
    #[must_use]
    pub fn commitments(&self) -> [Commitment; 3] {
        [
            self.notes[0].commitment,
            self.notes[1].commitment,
            self.notes[2].commitment,
        ]
    }
}

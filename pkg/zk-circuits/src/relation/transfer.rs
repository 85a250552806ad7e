use zk_primitives::{commit, Element, HALF_WIDTH};

use super::{FieldRef, FieldSpec, NoteSlot, RelationDefinition, SharedFieldGroup};
use crate::constants::{TRANSFER_FIELDS, TRANSFER_RELATION};

use super::FieldRole::{AmountHi, AmountLo, HashHi, HashLo, OwnerHi, OwnerLo};
use super::NoteSlot::{New1, New2, Old};

const SIGNATURE: [FieldSpec; TRANSFER_FIELDS] = [
    FieldSpec::public(Old, HashHi),
    FieldSpec::public(Old, HashLo),
    FieldSpec::private(Old, OwnerHi),
    FieldSpec::private(Old, OwnerLo),
    FieldSpec::private(Old, AmountHi),
    FieldSpec::private(Old, AmountLo),
    FieldSpec::public(New1, HashHi),
    FieldSpec::public(New1, HashLo),
    FieldSpec::private(New1, OwnerHi),
    FieldSpec::private(New1, OwnerLo),
    FieldSpec::private(New1, AmountHi),
    FieldSpec::private(New1, AmountLo),
    FieldSpec::public(New2, HashHi),
    FieldSpec::public(New2, HashLo),
    FieldSpec::private(New2, AmountHi),
    FieldSpec::private(New2, AmountLo),
];

const SHARED: [SharedFieldGroup; 1] = [SharedFieldGroup {
    name: "spender_owner",
    source: Old,
    target: New2,
    roles: &[OwnerHi, OwnerLo],
}];

/// Version 1 of the transfer relation: one spent note, a recipient note and a change note
pub static TRANSFER_V1: RelationDefinition = RelationDefinition {
    name: TRANSFER_RELATION,
    version: 1,
    source: include_str!("transfer_v1.zok"),
    signature: &SIGNATURE,
    shared: &SHARED,
    evaluate: evaluate_transfer,
};

/// Check every constraint of a transfer relation over `fields`
///
/// - each note's hash halves are the commitment of its owner and amount fields
/// - the spent note's low amount equals the sum of the new notes' low amounts
///
/// Any field that is missing or wider than 16 bytes makes the relation false.
#[must_use]
pub fn evaluate_transfer(relation: &RelationDefinition, fields: &[Element]) -> bool {
    let get = |note, role| {
        relation
            .resolve(FieldRef::new(note, role))
            .and_then(|i| fields.get(i))
            .copied()
    };

    let commitments_hold = NoteSlot::ALL.into_iter().all(|note| {
        let half = |role| get(note, role).and_then(Element::to_be_half);

        let (Some(hash_hi), Some(hash_lo)) = (get(note, HashHi), get(note, HashLo)) else {
            return false;
        };
        let (Some(owner_hi), Some(owner_lo), Some(amount_hi), Some(amount_lo)) =
            (half(OwnerHi), half(OwnerLo), half(AmountHi), half(AmountLo))
        else {
            return false;
        };

        let mut owner = [0; 2 * HALF_WIDTH];
        owner[..HALF_WIDTH].copy_from_slice(&owner_hi);
        owner[HALF_WIDTH..].copy_from_slice(&owner_lo);

        let mut amount = [0; 2 * HALF_WIDTH];
        amount[..HALF_WIDTH].copy_from_slice(&amount_hi);
        amount[HALF_WIDTH..].copy_from_slice(&amount_lo);

        commit(&owner, &amount).is_ok_and(|commitment| {
            commitment.hash_hi() == hash_hi && commitment.hash_lo() == hash_lo
        })
    });

    let conserved = match (get(Old, AmountLo), get(New1, AmountLo), get(New2, AmountLo)) {
        (Some(spent), Some(sent), Some(change)) => sent.checked_add(change) == Some(spent),
        _ => false,
    };

    commitments_hold && conserved
}

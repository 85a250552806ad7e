use ethnum::U256;
use expect_test::expect;
use proptest::prelude::*;
use test_strategy::proptest;

use super::*;
use crate::{
    data::{Amount, OwnerId},
    relation::FieldRole,
};

fn spender() -> OwnerId {
    "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4".parse().unwrap()
}

fn recipient() -> OwnerId {
    "0xAb8483F64d9C6d1EcF9b849Ae677dD3315835cb2".parse().unwrap()
}

#[test]
fn spend_five_send_one() {
    let request = TransferRequest::new(spender(), 5u64, recipient(), 1u64);
    let witness = assemble_transfer_witness(&request).unwrap();

    assert_eq!(witness.len(), 16);
    assert_eq!(witness.relation(), &TRANSFER_V1);

    expect![[r#"
        [
            "102100212976588726697073719464357903289",
            "12537345442001827878481951873055543665",
            "1530452586",
            "149020674686142704025204189025701649860",
            "0",
            "5",
            "161774219082028220356593657095676777280",
            "199760868427195128644352500904511991137",
            "2877588470",
            "103162767209113035528490247380627840178",
            "0",
            "1",
            "207594407746014147983817126059586465180",
            "161267617125040713933016902205775014753",
            "0",
            "4",
        ]
    "#]]
    .assert_debug_eq(&witness.to_decimal_strings());

    let [old, new1, new2] = witness.commitments();
    expect!["4ccfc926e9593f7d722fb605bb19bbb9096e9adaca87fb42d46b7a8b89275171"]
        .assert_eq(&old.to_hex());
    expect!["79b494ce80e7cd3f6aa3ce0c76c4534096488b37ec64085554986c8e7f00ed61"]
        .assert_eq(&new1.to_hex());
    expect!["9c2d3a869d0af9e3219959539b39ad9c79530366d97a50488813ee423e37eb61"]
        .assert_eq(&new2.to_hex());

    assert!(TRANSFER_V1.is_satisfied(witness.fields()).unwrap());
}

#[test]
fn change_note_belongs_to_spender() {
    let request = TransferRequest::new(spender(), 5u64, recipient(), 1u64);
    let witness = assemble_transfer_witness(&request).unwrap();

    let change = witness.note(NoteSlot::New2);
    assert_eq!(change.opening.owner, spender());
    assert_eq!(change.opening.amount, Amount::new(4));

    let old = witness.note(NoteSlot::Old).fields();
    let change = change.fields();
    assert_eq!(change.owner_hi, old.owner_hi);
    assert_eq!(change.owner_lo, old.owner_lo);
    assert_eq!(change.amount_lo, Element::from(4u64));

    // the recipient's owner differs, so the comparison above is not vacuous
    let sent = witness.note(NoteSlot::New1).fields();
    assert_ne!((sent.owner_hi, sent.owner_lo), (old.owner_hi, old.owner_lo));
}

#[test]
fn public_inputs_are_the_commitment_halves() {
    let request = TransferRequest::new(spender(), 5u64, recipient(), 1u64);
    let witness = assemble_transfer_witness(&request).unwrap();

    let expected = witness
        .commitments()
        .iter()
        .flat_map(|c| [c.hash_hi(), c.hash_lo()])
        .collect::<Vec<_>>();

    assert_eq!(witness.public_inputs(), expected);
}

#[test]
fn sending_everything_leaves_zero_change() {
    let request = TransferRequest::new(spender(), 7u64, recipient(), 7u64);
    let witness = assemble_transfer_witness(&request).unwrap();

    assert_eq!(witness.fields()[15], 0u64);
    assert!(TRANSFER_V1.is_satisfied(witness.fields()).unwrap());
}

#[test]
fn sending_more_than_the_note_fails() {
    let request = TransferRequest::new(spender(), 1u64, recipient(), 2u64);
    let err = assemble_transfer_witness(&request).unwrap_err();

    assert!(matches!(
        err,
        Error::NegativeChange { spend, send } if spend == Amount::new(1) && send == Amount::new(2)
    ));
}

#[test]
fn amounts_wider_than_a_half_are_rejected() {
    let huge = Amount::from(U256::ONE << 130u32);
    let request = TransferRequest::new(spender(), huge, recipient(), 1u64);

    assert!(matches!(
        assemble_transfer_witness(&request),
        Err(Error::Encoding(zk_primitives::Error::EncodingOverflow { width: 16, .. }))
    ));
}

#[test]
fn every_field_is_constrained() {
    let request = TransferRequest::new(spender(), 5u64, recipient(), 1u64);
    let witness = assemble_transfer_witness(&request).unwrap();

    for i in 0..witness.len() {
        let mut fields = witness.fields().to_vec();
        fields[i] = fields[i] + 1u64;

        assert!(
            !TRANSFER_V1.is_satisfied(&fields).unwrap(),
            "changing {} should break the relation",
            TRANSFER_V1.field_names()[i]
        );
    }
}

#[test]
fn change_to_another_owner_is_unsatisfiable() {
    let request = TransferRequest::new(spender(), 5u64, recipient(), 1u64);
    let witness = assemble_transfer_witness(&request).unwrap();

    // a change note paid to the recipient instead of back to the spender
    let stolen = Note::new(NoteOpening::new(recipient(), 4u64));
    let mut fields = witness.into_fields();
    fields[12] = stolen.commitment.hash_hi();
    fields[13] = stolen.commitment.hash_lo();

    assert!(!TRANSFER_V1.is_satisfied(&fields).unwrap());
}

#[test]
fn inflating_the_change_is_unsatisfiable() {
    let honest = assemble_transfer_witness(&TransferRequest::new(spender(), 5u64, recipient(), 1u64))
        .unwrap();

    // a fully consistent change note worth more than the remainder
    let inflated = Note::new(NoteOpening::new(spender(), 10u64));
    let mut fields = honest.into_fields();
    fields[12] = inflated.commitment.hash_hi();
    fields[13] = inflated.commitment.hash_lo();
    fields[15] = Element::from(10u64);

    assert!(!TRANSFER_V1.is_satisfied(&fields).unwrap());
}

#[proptest]
fn assembled_witness_satisfies_transfer(
    #[strategy(any::<[u8; 20]>())] spender: [u8; 20],
    #[strategy(any::<[u8; 20]>())] recipient: [u8; 20],
    #[strategy(any::<u64>())] spend: u64,
    #[strategy(0..=#spend)] send: u64,
) {
    let request = TransferRequest::new(OwnerId(spender), spend, OwnerId(recipient), send);
    let witness = assemble_transfer_witness(&request).unwrap();
    let fields = witness.fields();

    let [old, new1, new2] = witness.commitments();
    prop_assert_eq!(old, NoteOpening::new(OwnerId(spender), spend).commitment());
    prop_assert_eq!(new1, NoteOpening::new(OwnerId(recipient), send).commitment());
    prop_assert_eq!(
        new2,
        NoteOpening::new(OwnerId(spender), spend - send).commitment()
    );

    for (i, c) in [(0, old), (6, new1), (12, new2)] {
        prop_assert_eq!(fields[i], c.hash_hi());
        prop_assert_eq!(fields[i + 1], c.hash_lo());
    }

    prop_assert_eq!(fields[15] + fields[11], fields[5]);
    prop_assert!(TRANSFER_V1.is_satisfied(fields).unwrap());
}

//! Declared relations and their input signatures
//!
//! A relation's signature is the exact order in which the proving backend expects its inputs.
//! Reordering fields produces a different relation, so the signature is data that the witness
//! assembler walks rather than an order repeated by hand.
//!
//! ```text
//!  (Private)                              (Public)
//!                      ┌──────────┐
//!  old  opening  ───►  │          │  ───►  old  commitment
//!  new1 opening  ───►  │ transfer │  ───►  new1 commitment
//!  new2 amount   ───►  │          │  ───►  new2 commitment
//!                      └──────────┘
//! ```

use std::fmt;

use serde::Serialize;
use zk_primitives::Element;

use crate::{Error, Result};

mod transfer;

pub use transfer::{evaluate_transfer, TRANSFER_V1};

/// Every registered relation, all versions
pub static RELATIONS: &[&RelationDefinition] = &[&TRANSFER_V1];

/// Whether a field is revealed to the verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// Which of the transfer's three notes a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSlot {
    /// The note being spent
    Old,
    /// The note paid to the recipient
    New1,
    /// The change note returned to the spender
    New2,
}

impl NoteSlot {
    pub const ALL: [Self; 3] = [Self::Old, Self::New1, Self::New2];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Old => 0,
            Self::New1 => 1,
            Self::New2 => 2,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New1 => "new1",
            Self::New2 => "new2",
        }
    }
}

/// Which part of a note a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    HashHi,
    HashLo,
    OwnerHi,
    OwnerLo,
    AmountHi,
    AmountLo,
}

impl FieldRole {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HashHi => "hash_hi",
            Self::HashLo => "hash_lo",
            Self::OwnerHi => "owner_hi",
            Self::OwnerLo => "owner_lo",
            Self::AmountHi => "amount_hi",
            Self::AmountLo => "amount_lo",
        }
    }
}

/// A single field of a single note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldRef {
    pub note: NoteSlot,
    pub role: FieldRole,
}

impl FieldRef {
    #[must_use]
    pub const fn new(note: NoteSlot, role: FieldRole) -> Self {
        Self { note, role }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.note.name(), self.role.name())
    }
}

/// One entry of a relation's input signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldSpec {
    pub field: FieldRef,
    pub visibility: Visibility,
}

impl FieldSpec {
    #[must_use]
    pub const fn public(note: NoteSlot, role: FieldRole) -> Self {
        Self {
            field: FieldRef::new(note, role),
            visibility: Visibility::Public,
        }
    }

    #[must_use]
    pub const fn private(note: NoteSlot, role: FieldRole) -> Self {
        Self {
            field: FieldRef::new(note, role),
            visibility: Visibility::Private,
        }
    }
}

/// Fields of `target` that are not inputs of their own, but reuse the same fields of `source`
///
/// The relation constrains `target` with `source`'s variables, so the two notes provably share
/// these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SharedFieldGroup {
    pub name: &'static str,
    pub source: NoteSlot,
    pub target: NoteSlot,
    pub roles: &'static [FieldRole],
}

/// A named, versioned relation: its source for the proving backend, its input signature and the
/// fields it shares between notes
#[derive(Clone, Copy)]
pub struct RelationDefinition {
    pub name: &'static str,
    pub version: u32,
    /// Program text handed to the proving backend's compiler
    pub source: &'static str,
    pub signature: &'static [FieldSpec],
    pub shared: &'static [SharedFieldGroup],
    /// Native evaluation of the relation over a full input vector
    pub(crate) evaluate: fn(&RelationDefinition, &[Element]) -> bool,
}

impl fmt::Debug for RelationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationDefinition")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("fields", &self.signature.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for RelationDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for RelationDefinition {}

impl RelationDefinition {
    /// Find a registered relation by name and version
    pub fn lookup(name: &str, version: u32) -> Result<&'static Self> {
        RELATIONS
            .iter()
            .copied()
            .find(|r| r.name == name && r.version == version)
            .ok_or_else(|| Error::UnknownRelation {
                name: name.to_owned(),
                version,
            })
    }

    /// The highest registered version of a relation
    #[must_use]
    pub fn latest(name: &str) -> Option<&'static Self> {
        RELATIONS
            .iter()
            .copied()
            .filter(|r| r.name == name)
            .max_by_key(|r| r.version)
    }

    /// Number of fields in the signature
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.signature.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }

    /// Positions of the public fields, in signature order
    pub fn public_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.signature
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.visibility == Visibility::Public)
            .map(|(i, _)| i)
    }

    #[must_use]
    pub fn public_len(&self) -> usize {
        self.public_positions().count()
    }

    #[must_use]
    pub fn private_len(&self) -> usize {
        self.len() - self.public_len()
    }

    /// Position of `field` in the signature, if it is an input of its own
    #[must_use]
    pub fn position(&self, field: FieldRef) -> Option<usize> {
        self.signature.iter().position(|spec| spec.field == field)
    }

    /// The shared group that supplies `field`, if it isn't an input of its own
    #[must_use]
    pub fn shared_group(&self, field: FieldRef) -> Option<&'static SharedFieldGroup> {
        self.shared
            .iter()
            .find(|group| group.target == field.note && group.roles.contains(&field.role))
    }

    /// Position of the input that holds `field`'s value, following shared groups
    #[must_use]
    pub fn resolve(&self, field: FieldRef) -> Option<usize> {
        self.position(field).or_else(|| {
            let group = self.shared_group(field)?;
            self.position(FieldRef::new(group.source, field.role))
        })
    }

    /// Dotted names of every input, in signature order
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.signature
            .iter()
            .map(|spec| spec.field.to_string())
            .collect()
    }

    /// Fail unless `fields` has exactly one value per signature entry
    pub fn check_len(&self, fields: &[Element]) -> Result<()> {
        if fields.len() == self.len() {
            Ok(())
        } else {
            Err(Error::WitnessLength {
                expected: self.len(),
                actual: fields.len(),
            })
        }
    }

    /// Evaluate the relation natively over `fields`
    ///
    /// The result is a single boolean: a failing relation gives no hint about which constraint
    /// failed.
    pub fn is_satisfied(&self, fields: &[Element]) -> Result<bool> {
        self.check_len(fields)?;
        Ok((self.evaluate)(self, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        TRANSFER_FIELDS, TRANSFER_PRIVATE_INPUTS, TRANSFER_PUBLIC_INPUTS, TRANSFER_RELATION,
    };
    use expect_test::expect;

    #[test]
    fn registry_lookup() {
        let relation = RelationDefinition::lookup(TRANSFER_RELATION, 1).unwrap();
        assert_eq!(relation, &TRANSFER_V1);
        assert_eq!(RelationDefinition::latest(TRANSFER_RELATION), Some(&TRANSFER_V1));

        assert!(matches!(
            RelationDefinition::lookup(TRANSFER_RELATION, 99),
            Err(Error::UnknownRelation { version: 99, .. })
        ));
        assert!(RelationDefinition::latest("mint").is_none());
    }

    #[test]
    fn transfer_signature_shape() {
        assert_eq!(TRANSFER_V1.len(), TRANSFER_FIELDS);
        assert_eq!(TRANSFER_V1.public_len(), TRANSFER_PUBLIC_INPUTS);
        assert_eq!(TRANSFER_V1.private_len(), TRANSFER_PRIVATE_INPUTS);
        assert_eq!(
            TRANSFER_V1.public_positions().collect::<Vec<_>>(),
            vec![0, 1, 6, 7, 12, 13]
        );
    }

    #[test]
    fn transfer_signature_order() {
        expect![[r#"
            [
                "old.hash_hi",
                "old.hash_lo",
                "old.owner_hi",
                "old.owner_lo",
                "old.amount_hi",
                "old.amount_lo",
                "new1.hash_hi",
                "new1.hash_lo",
                "new1.owner_hi",
                "new1.owner_lo",
                "new1.amount_hi",
                "new1.amount_lo",
                "new2.hash_hi",
                "new2.hash_lo",
                "new2.amount_hi",
                "new2.amount_lo",
            ]
        "#]]
        .assert_debug_eq(&TRANSFER_V1.field_names());
    }

    #[test]
    fn change_owner_resolves_to_spender_owner() {
        let new2_owner_hi = FieldRef::new(NoteSlot::New2, FieldRole::OwnerHi);
        let new2_owner_lo = FieldRef::new(NoteSlot::New2, FieldRole::OwnerLo);

        assert_eq!(TRANSFER_V1.position(new2_owner_hi), None);
        assert_eq!(TRANSFER_V1.resolve(new2_owner_hi), Some(2));
        assert_eq!(TRANSFER_V1.resolve(new2_owner_lo), Some(3));

        // only the change note's owner is shared
        let new1_owner_hi = FieldRef::new(NoteSlot::New1, FieldRole::OwnerHi);
        assert_eq!(TRANSFER_V1.shared_group(new1_owner_hi), None);
        assert_eq!(TRANSFER_V1.resolve(new1_owner_hi), Some(8));
    }

    #[test]
    fn source_declares_every_input_in_order() {
        let declared = TRANSFER_V1
            .signature
            .iter()
            .map(|spec| {
                let name = format!("{}_{}", spec.field.note.name(), spec.field.role.name());
                match spec.visibility {
                    Visibility::Public => format!("field {name}"),
                    Visibility::Private => format!("private field {name}"),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        assert!(TRANSFER_V1.source.contains(&format!("def main({declared})")));
    }

    #[test]
    fn wrong_length_is_an_error() {
        assert!(matches!(
            TRANSFER_V1.is_satisfied(&[Element::ZERO; 15]),
            Err(Error::WitnessLength {
                expected: 16,
                actual: 15
            })
        ));
    }
}

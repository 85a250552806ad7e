use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a note on the ledger: `Unknown -> Created -> Spent`
///
/// The discriminants are the values the ledger contract returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum NoteState {
    #[default]
    Unknown = 0,
    Created = 1,
    Spent = 2,
}

impl NoteState {
    /// Whether the ledger has ever seen this note
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Whether `self -> next` is a legal transition
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unknown, Self::Created) | (Self::Created, Self::Spent)
        )
    }
}

impl TryFrom<u8> for NoteState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Created),
            2 => Ok(Self::Spent),
            other => Err(other),
        }
    }
}

impl From<NoteState> for u8 {
    fn from(state: NoteState) -> Self {
        state as u8
    }
}

impl fmt::Display for NoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Created => "created",
            Self::Spent => "spent",
        })
    }
}

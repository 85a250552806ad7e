use std::{fmt, path::Path};

use crate::{Error, Result};

/// Which of the two keys produced by the proving system's setup a blob is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    Proving,
    Verification,
}

impl KeyPurpose {
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Proving => "proving",
            Self::Verification => "verification",
        }
    }

    /// The file this key is stored in, relative to the keys directory
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.key", self.name())
    }
}

impl fmt::Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque key blob, only meaningful to the proving backend that produced it
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Vec<u8>);

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({} bytes)", self.0.len())
    }
}

impl KeyMaterial {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Read `<dir>/<purpose>.key`
    pub fn load(dir: impl AsRef<Path>, purpose: KeyPurpose) -> Result<Self> {
        let path = dir.as_ref().join(purpose.file_name());
        tracing::debug!(path = %path.display(), %purpose, "loading key");

        std::fs::read(&path)
            .map(Self)
            .map_err(|source| Error::Key { purpose, source })
    }
}

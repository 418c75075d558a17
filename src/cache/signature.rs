//! Structural fingerprint over the character folder list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scanner::FolderDescriptor;

/// BLAKE3 digest over an ordered list of folder descriptors.
///
/// Equal ordered inputs give equal signatures. Any rename, path or icon
/// change, override change, addition or removal gives a different one.
/// Serialized as a lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderSignature([u8; 32]);

impl FolderSignature {
    /// Compute the signature of an ordered folder list.
    ///
    /// Every variable-length field is length-prefixed, so `"ab" + "c"` and
    /// `"a" + "bc"` hash differently. Paths are hashed as raw OS bytes, so
    /// two non-UTF-8 names never collapse to the same replacement text.
    #[must_use]
    pub fn compute(folders: &[FolderDescriptor]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for folder in folders {
            write_field(&mut hasher, folder.name.as_bytes());
            write_field(&mut hasher, folder.directory.as_os_str().as_encoded_bytes());
            write_field(&mut hasher, folder.icon_path.as_os_str().as_encoded_bytes());
            match folder.preview_override {
                Some(id) => {
                    hasher.update(&[1]);
                    hasher.update(&id.to_le_bytes());
                }
                None => {
                    hasher.update(&[0]);
                    hasher.update(&0u32.to_le_bytes());
                }
            }
        }
        hasher.update(&(folders.len() as u64).to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

fn write_field(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

impl fmt::Debug for FolderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FolderSignature({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for FolderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<FolderSignature> for String {
    fn from(signature: FolderSignature) -> Self {
        signature.to_hex()
    }
}

impl TryFrom<String> for FolderSignature {
    type Error = blake3::HexError;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        blake3::Hash::from_hex(hex).map(|hash| Self(*hash.as_bytes()))
    }
}

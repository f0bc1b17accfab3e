use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;
use super::kind::AttachmentKind;

const TOKEN_LEN: usize = 32;

/// Store-generated name of one persisted attachment.
///
/// Rendered as `{kind}_{token}.{ext}` where `token` is the 32-character
/// lowercase hex form of a random UUIDv4. The same string is the storage key,
/// so a reference can never contain path separators or traversal segments.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AttachmentRef {
    kind: AttachmentKind,
    name: String,
}

impl AttachmentRef {
    /// Generate a fresh reference for a file of `kind` with an already
    /// validated lowercase `extension`.
    pub fn generate(kind: AttachmentKind, extension: &str) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            kind,
            name: format!("{}_{token}.{extension}", kind.as_str()),
        }
    }

    /// Parse a reference received from a client.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let invalid = || StorageError::InvalidRef(s.to_string());

        let (prefix, rest) = s.split_once('_').ok_or_else(invalid)?;
        let kind = prefix.parse::<AttachmentKind>().map_err(|_| invalid())?;
        let (token, extension) = rest.rsplit_once('.').ok_or_else(invalid)?;

        let token_ok = token.len() == TOKEN_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !token_ok || !kind.allows(extension) {
            return Err(invalid());
        }

        Ok(Self {
            kind,
            name: s.to_string(),
        })
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Extension without the leading dot.
    pub fn extension(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default()
    }
}

impl fmt::Debug for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttachmentRef({})", self.name)
    }
}

impl fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for AttachmentRef {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AttachmentRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for AttachmentRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical class of an attachment. Each kind has its own extension allow-list
/// and its own partition in the attachment store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
    Video,
    Document,
}

impl AttachmentKind {
    pub const ALL: &'static [AttachmentKind] =
        &[Self::Image, Self::Audio, Self::Video, Self::Document];

    /// Prefix used in references and as the storage partition name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    /// Lowercase extensions accepted for this kind.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["png", "jpg", "jpeg", "gif"],
            Self::Audio => &["mp3", "wav", "webm"],
            Self::Video => &["mp4", "mov", "webm"],
            Self::Document => &["pdf", "docx"],
        }
    }

    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions().contains(&extension)
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            _ => Err(format!("unknown attachment kind '{s}'")),
        }
    }
}

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of heritage site a record describes.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
/// The stored value is the display name, so title/category searches see "Sacred Tree".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum Category {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Temple"))]
    Temple,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Fort"))]
    Fort,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Monument"))]
    Monument,
    #[serde(rename = "Sacred Tree")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Sacred Tree"))]
    SacredTree,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Well"))]
    Well,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Statue"))]
    Statue,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Market"))]
    Market,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Other"))]
    Other,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Self::Temple,
        Self::Fort,
        Self::Monument,
        Self::SacredTree,
        Self::Well,
        Self::Statue,
        Self::Market,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temple => "Temple",
            Self::Fort => "Fort",
            Self::Monument => "Monument",
            Self::SacredTree => "Sacred Tree",
            Self::Well => "Well",
            Self::Statue => "Statue",
            Self::Market => "Market",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language the contributor wrote the description in.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum Language {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "English"))]
    English,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Telugu"))]
    Telugu,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Hindi"))]
    Hindi,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Other"))]
    Other,
}

impl Language {
    pub const ALL: &'static [Language] = &[Self::English, Self::Telugu, Self::Hindi, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Telugu => "Telugu",
            Self::Hindi => "Hindi",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a value outside one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVocabularyError {
    invalid: String,
    expected: String,
}

impl fmt::Display for ParseVocabularyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value '{}'. Valid values: {}",
            self.invalid, self.expected
        )
    }
}

impl std::error::Error for ParseVocabularyError {}

/// Lowercase and drop separators so "Sacred Tree", "sacred_tree" and "SACRED-TREE" compare equal.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_closed<T: Copy>(
    s: &str,
    all: &[T],
    name: impl Fn(&T) -> &'static str,
) -> Result<T, ParseVocabularyError> {
    let wanted = normalize(s);
    all.iter()
        .copied()
        .find(|v| normalize(name(v)) == wanted)
        .ok_or_else(|| ParseVocabularyError {
            invalid: s.to_string(),
            expected: all.iter().map(&name).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for Category {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_closed(s, Self::ALL, Category::as_str)
    }
}

impl FromStr for Language {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_closed(s, Self::ALL, Language::as_str)
    }
}

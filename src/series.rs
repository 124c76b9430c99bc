//! Series identifiers shared by the library and catalog sides of the pipeline.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Identifier of a series in the metadata provider's namespace.
///
/// TMDB hands out numeric ids, while Jellyfin stores the same id as a string
/// inside an item's `ProviderIds`. Both shapes deserialize into the same
/// value, which is kept in its string form and used verbatim as the cache
/// file stem. Only ASCII alphanumerics and `-` are accepted, so two distinct
/// identifiers never map to the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId(String);

impl SeriesId {
    /// Creates an identifier from its textual form.
    ///
    /// Surrounding whitespace is removed. Returns `None` for blank input,
    /// which is how an unset provider link shows up in Jellyfin, and for
    /// input containing characters other than ASCII alphanumerics and `-`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');

        valid.then(|| Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for SeriesId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SeriesId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(SeriesId::from(id)),
            Raw::Text(text) => SeriesId::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid series id '{}'", text))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: SeriesId = serde_json::from_str("1399").unwrap();
        let from_string: SeriesId = serde_json::from_str("\"1399\"").unwrap();

        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "1399");
    }

    #[test]
    fn test_deserialize_rejects_empty_string() {
        assert!(serde_json::from_str::<SeriesId>("\"  \"").is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(SeriesId::parse(" 42 ").unwrap().to_string(), "42");
        assert_eq!(SeriesId::parse(""), None);
    }

    #[test]
    fn test_parse_rejects_characters_unfit_for_file_names() {
        assert_eq!(SeriesId::parse("a.b"), None);
        assert_eq!(SeriesId::parse("a_b"), None);
        assert_eq!(SeriesId::parse("../1399"), None);
        assert_eq!(SeriesId::parse("tt-0944947").unwrap().as_str(), "tt-0944947");
    }
}

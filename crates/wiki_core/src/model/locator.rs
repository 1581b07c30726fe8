//! Article locator model and wire codec.
//!
//! # Responsibility
//! - Represent a namespace-qualified reference to an article.
//! - Encode/decode the compact `namespace/name` request parameter form.
//!
//! # Invariants
//! - Decoding splits on the first `/`; everything after it is the name.
//! - `name` may be either the stable article ID or the article title.
//! - Encoding does not escape; namespaces containing `/` cannot round-trip,
//!   which is why article validation rejects them.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Delimiter between namespace and name in the wire form.
pub const LOCATOR_DELIMITER: char = '/';

/// Namespace-qualified reference to an article by ID or title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub namespace: String,
    pub name: String,
}

impl Locator {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Encodes this locator as `namespace/name`.
    pub fn serialize(&self) -> String {
        format!("{}{LOCATOR_DELIMITER}{}", self.namespace, self.name)
    }

    /// Decodes a `namespace/name` string, splitting on the first `/`.
    ///
    /// # Errors
    /// - Returns `LocatorError::MissingDelimiter` when no `/` is present.
    pub fn deserialize(value: &str) -> Result<Self, LocatorError> {
        match value.split_once(LOCATOR_DELIMITER) {
            Some((namespace, name)) => Ok(Self::new(namespace, name)),
            None => Err(LocatorError::MissingDelimiter(value.to_string())),
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{LOCATOR_DELIMITER}{}", self.namespace, self.name)
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s)
    }
}

/// Locator decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    MissingDelimiter(String),
}

impl Display for LocatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDelimiter(value) => {
                write!(f, "error deserializing locator `{value}`: missing `/`")
            }
        }
    }
}

impl Error for LocatorError {}

#[cfg(test)]
mod tests {
    use super::{Locator, LocatorError};

    #[test]
    fn serialize_joins_namespace_and_name() {
        let locator = Locator::new("public", "Intro");
        assert_eq!(locator.serialize(), "public/Intro");
        assert_eq!(locator.to_string(), "public/Intro");
    }

    #[test]
    fn deserialize_splits_on_first_slash_only() {
        let locator = Locator::deserialize("ns/a/b").expect("locator should parse");
        assert_eq!(locator.namespace, "ns");
        assert_eq!(locator.name, "a/b");
    }

    #[test]
    fn deserialize_accepts_empty_segments() {
        let locator: Locator = "/".parse().expect("bare slash should parse");
        assert_eq!(locator, Locator::new("", ""));
    }

    #[test]
    fn deserialize_rejects_missing_delimiter() {
        let err = Locator::deserialize("no-slash").expect_err("missing slash must fail");
        assert_eq!(err, LocatorError::MissingDelimiter("no-slash".to_string()));
    }

    #[test]
    fn name_with_slashes_round_trips() {
        let locator = Locator::new("maths", "Hartshorne/Chapter II");
        let decoded = Locator::deserialize(&locator.serialize()).expect("round trip");
        assert_eq!(decoded, locator);
    }
}

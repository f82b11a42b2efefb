use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use super::InvalidRecord;

/// Identifier of an attendee record, as issued by the profile store.
///
/// Ids are opaque to the engine. The only structural rule is that they are
/// non-empty and carry no whitespace, so they render unambiguously in
/// breadcrumbs and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttendeeId(String);

impl AttendeeId {
    /// Parse and validate an id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecord::AttendeeId`] for empty input or input
    /// containing whitespace.
    pub fn parse(raw: &str) -> Result<Self, InvalidRecord> {
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(InvalidRecord::AttendeeId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Wrap a string without validation. Intended for ids that were already
    /// validated by the profile store and for tests.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AttendeeId {
    type Err = InvalidRecord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AttendeeId {
    type Error = InvalidRecord;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttendeeId> for String {
    fn from(value: AttendeeId) -> Self {
        value.0
    }
}

impl Borrow<str> for AttendeeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AttendeeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

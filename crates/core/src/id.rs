//! Record identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-assigned identifier of a record within its collection.
///
/// Identifiers are opaque: the client never inspects or fabricates them, it
/// only echoes back what a list/create/update response handed out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid record id '{0}'")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses an identifier typed or pasted by a user.
///
/// Identifiers end up as a single URL path segment, so blanks and slashes are
/// rejected here rather than producing a request against the wrong route.
impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains(char::is_whitespace) {
            return Err(InvalidRecordId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_accepts_opaque_ids() {
        let id: RecordId = " 65f1c2ab9e ".parse().unwrap();
        assert_eq!(id.as_str(), "65f1c2ab9e");
    }

    #[test]
    fn parse_rejects_path_breaking_ids() {
        assert!("".parse::<RecordId>().is_err());
        assert!("a/b".parse::<RecordId>().is_err());
        assert!("a b".parse::<RecordId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = RecordId::new("abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("abc"));
    }
}

//! Check identifiers
//!
//! Pingdom issues numeric check ids, but the id is only ever interpolated into
//! a path, so any textual id is accepted as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a Pingdom check (a monitored endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(String);

impl CheckId {
    /// Path of this check relative to the versioned API root.
    pub fn path(&self) -> String {
        format!("{}/{}", crate::constants::CHECKS_PATH, self.0)
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CheckId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CheckId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CheckId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_textual_ids_render_the_same() {
        assert_eq!(CheckId::from(85975_u64).to_string(), "85975");
        assert_eq!(CheckId::from("85975"), CheckId::from(85975_u64));
    }

    #[test]
    fn path_is_nested_under_checks() {
        assert_eq!(CheckId::from(42_u64).path(), "/checks/42");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&CheckId::from("7")).unwrap();
        assert_eq!(json, "\"7\"");
    }
}

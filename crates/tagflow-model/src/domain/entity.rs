use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a remote catalog entity (tag, performer, studio).
///
/// The catalog assigns these; nothing in this codebase inspects their
/// contents beyond equality and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A tag entity as returned by the remote catalog.
///
/// Tags are indexed by a unique display name; alias names are treated as
/// equivalent for lookup purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTag {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl RemoteTag {
    /// Case-insensitive match against the display name or any alias.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, aliases: &[&str]) -> RemoteTag {
        RemoteTag {
            id: EntityId::new("42"),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn matches_display_name_case_insensitive() {
        let t = tag("Blonde", &[]);
        assert!(t.matches_name("blonde"));
        assert!(t.matches_name("BLONDE"));
        assert!(!t.matches_name("brunette"));
    }

    #[test]
    fn matches_alias() {
        let t = tag("blonde", &["blond", "yellow hair"]);
        assert!(t.matches_name("Blond"));
        assert!(t.matches_name("yellow hair"));
        assert!(!t.matches_name("yellow"));
    }

    #[test]
    fn deserializes_without_aliases() {
        let t: RemoteTag = serde_json::from_str(r#"{"id": "7", "name": "solo"}"#).unwrap();
        assert_eq!(t.id.as_str(), "7");
        assert!(t.aliases.is_empty());
    }

    #[test]
    fn entity_id_is_transparent_in_serde() {
        let id: EntityId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(id, EntityId::new("abc"));
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""abc""#);
    }
}

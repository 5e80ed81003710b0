use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the counterparty named on a trade instruction.
///
/// Ordering is lexicographic on the identifier, which is also the
/// tie-break order used when two entities rank on equal totals.
///
/// # Examples
///
/// ```
/// use settlement_report::core::entity::EntityId;
///
/// let foo = EntityId::new("foo");
/// let bar = EntityId::new("bar");
/// assert!(bar < foo);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this entity ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Role a manager plays in the cluster hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagerRole {
    /// The elected group leader (root of the hierarchy).
    Leader,
    /// A subordinate group manager.
    Member,
}

impl std::fmt::Display for ManagerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManagerRole::Leader => write!(f, "leader"),
            ManagerRole::Member => write!(f, "member"),
        }
    }
}

/// The cluster-reported shape of one manager: its identifier, role, and the
/// managers it knows as direct members. Nested members describe deeper
/// levels of the hierarchy. This is the opaque input to the tree builder;
/// canopy never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerDescription {
    pub id: String,
    pub role: ManagerRole,
    #[serde(default)]
    pub members: Vec<ManagerDescription>,
}

impl ManagerDescription {
    pub fn leader(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ManagerRole::Leader,
            members: Vec::new(),
        }
    }

    pub fn member(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ManagerRole::Member,
            members: Vec::new(),
        }
    }

    pub fn with_members(mut self, members: Vec<ManagerDescription>) -> Self {
        self.members = members;
        self
    }

    /// Total managers described, including this one.
    pub fn total_count(&self) -> usize {
        1 + self.members.iter().map(|m| m.total_count()).sum::<usize>()
    }

    /// Decode a description from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }
}

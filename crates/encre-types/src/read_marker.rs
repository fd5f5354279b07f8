//! Typed keys for the per-conversation last-read map.
//!
//! The local map and the backend use different namespaces: gardens keep
//! their own `garden_` prefix locally but share the `circle` conversation
//! type on the wire. Both serializations live here so they cannot drift
//! apart, and so no caller ever assembles a key by string concatenation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Circle,
    Duo,
    Garden,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadMarkerKey {
    pub kind: ConversationKind,
    pub id: String,
}

impl ReadMarkerKey {
    pub fn circle(id: impl Into<String>) -> Self {
        Self { kind: ConversationKind::Circle, id: id.into() }
    }

    pub fn duo(id: impl Into<String>) -> Self {
        Self { kind: ConversationKind::Duo, id: id.into() }
    }

    pub fn garden(id: impl Into<String>) -> Self {
        Self { kind: ConversationKind::Garden, id: id.into() }
    }

    /// Key used in the local last-read map.
    pub fn storage_key(&self) -> String {
        let prefix = match self.kind {
            ConversationKind::Circle => "circle",
            ConversationKind::Duo => "duo",
            ConversationKind::Garden => "garden",
        };
        format!("{}_{}", prefix, self.id)
    }

    /// Conversation type tag sent to the backend. Gardens are recorded in
    /// the circle table server-side; markers written under that scheme
    /// must keep resolving, so the alias is part of the wire contract.
    pub fn wire_type(&self) -> &'static str {
        match self.kind {
            ConversationKind::Circle | ConversationKind::Garden => "circle",
            ConversationKind::Duo => "duo",
        }
    }
}

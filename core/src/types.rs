/// Shared types for the sync engine
use serde::{Deserialize, Serialize};

/// Lifecycle of a message in the local view.
///
/// Anything merged from the server is Confirmed; only locally-originated
/// messages pass through Pending and possibly Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    /// Sent optimistically, awaiting the server id
    Pending,
    /// Acknowledged by the server
    Confirmed,
    /// Send attempt failed; retry available
    Failed,
}

/// One message in the active conversation view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Server-issued id in string form, or a `temp-` id while unconfirmed
    pub id: String,
    pub content: String,
    /// Carried as an opaque string; locally-created messages stamp RFC3339
    pub timestamp: String,
    pub sender_is_self: bool,
    pub is_read: bool,
    pub state: DeliveryState,
}

impl Message {
    pub fn is_pending(&self) -> bool {
        self.state == DeliveryState::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == DeliveryState::Confirmed
    }
}

/// The other participant, as reported by the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerProfile {
    #[serde(deserialize_with = "crate::transport::de_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

impl PeerProfile {
    /// Minimal profile for a peer the server has not described yet
    pub fn bare(peer_id: &str) -> Self {
        Self {
            id: peer_id.to_string(),
            username: String::new(),
            full_name: String::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

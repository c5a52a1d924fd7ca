/// Active-conversation state shared across the pipelines.
///
/// Every outbound request snapshots the (peer id, generation) pair at
/// dispatch time; continuations compare it against the live generation on
/// arrival and drop their result on mismatch. Write guards are never held
/// across an await.
use tokio::sync::RwLock;

/// Conversation switch controller phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoConversation,
    Loading,
    Active,
}

#[derive(Debug, Clone)]
struct SessionState {
    phase: Phase,
    peer_id: Option<String>,
    last_seen_id: Option<String>,
    generation: u64,
}

/// Cursor + phase for the selected peer. One per engine.
#[derive(Debug)]
pub struct Session {
    inner: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionState {
                phase: Phase::NoConversation,
                peer_id: None,
                last_seen_id: None,
                generation: 0,
            }),
        }
    }

    pub async fn phase(&self) -> Phase {
        self.inner.read().await.phase
    }

    pub async fn peer_id(&self) -> Option<String> {
        self.inner.read().await.peer_id.clone()
    }

    pub async fn cursor(&self) -> Option<String> {
        self.inner.read().await.last_seen_id.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Snapshot of (peer id, generation) for tagging an outbound request.
    /// None unless a conversation is Active.
    pub async fn dispatch_tag(&self) -> Option<(String, u64)> {
        let state = self.inner.read().await;
        if state.phase != Phase::Active {
            return None;
        }
        state
            .peer_id
            .as_ref()
            .map(|peer| (peer.clone(), state.generation))
    }

    /// Begin loading a new peer: bump the generation, clear the cursor.
    /// Returns the new generation for the loader to carry.
    pub async fn begin_loading(&self, peer_id: &str) -> u64 {
        let mut state = self.inner.write().await;
        state.generation += 1;
        state.phase = Phase::Loading;
        state.peer_id = Some(peer_id.to_string());
        state.last_seen_id = None;
        state.generation
    }

    /// Move Loading -> Active with the history cursor.
    /// Refused (false) if another switch happened in the meantime.
    pub async fn activate(&self, generation: u64, last_seen_id: Option<String>) -> bool {
        let mut state = self.inner.write().await;
        if state.generation != generation {
            return false;
        }
        state.phase = Phase::Active;
        state.last_seen_id = last_seen_id;
        true
    }

    /// Back to NoConversation after a failed history load.
    pub async fn reset(&self, generation: u64) {
        let mut state = self.inner.write().await;
        if state.generation != generation {
            return;
        }
        state.phase = Phase::NoConversation;
        state.peer_id = None;
        state.last_seen_id = None;
    }

    /// Advance the cursor; ignored if the generation moved on.
    pub async fn advance_cursor(&self, generation: u64, id: &str) {
        let mut state = self.inner.write().await;
        if state.generation != generation {
            return;
        }
        state.last_seen_id = Some(id.to_string());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

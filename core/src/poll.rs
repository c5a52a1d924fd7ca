/// Polling synchronizer: cursor-based incremental merge.
///
/// Every cycle snapshots the (peer, generation) tag at dispatch; a response
/// that outlives its conversation is dropped, never merged. Failures are
/// logged and the cycle ends; the next tick starts clean.
use crate::session::Session;
use crate::store::{MessageStore, PendingRegistry};
use crate::transport::{ChatTransport, WireMessage};
use crate::types::{DeliveryState, Message};
use crate::view::ChatView;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub struct PollSynchronizer {
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn ChatView>,
    store: Arc<RwLock<MessageStore>>,
    pending: Arc<RwLock<PendingRegistry>>,
    session: Arc<Session>,
    user_scrolling: Arc<AtomicBool>,
}

impl PollSynchronizer {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn ChatView>,
        store: Arc<RwLock<MessageStore>>,
        pending: Arc<RwLock<PendingRegistry>>,
        session: Arc<Session>,
        user_scrolling: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transport,
            view,
            store,
            pending,
            session,
            user_scrolling,
        }
    }

    /// One poll cycle: fetch messages newer than the cursor and merge them.
    pub async fn tick(&self) {
        let (peer_id, generation) = match self.session.dispatch_tag().await {
            Some(tag) => tag,
            None => return,
        };
        let last_seen = self.session.cursor().await;

        let response = match self
            .transport
            .poll_updates(&peer_id, last_seen.as_deref())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("poll cycle for {} failed: {}", peer_id, e);
                return;
            }
        };

        if self.session.generation().await != generation {
            debug!("dropping stale poll response for {}", peer_id);
            return;
        }

        self.merge(response.messages, generation).await;
    }

    /// Merge incoming messages in server order:
    /// skip entries without an id, entries already stored (dedup by
    /// identity, not content), and entries whose id is still a tracked
    /// temporary id. Everything else appends as received.
    async fn merge(&self, incoming: Vec<WireMessage>, generation: u64) {
        let appended = {
            let mut store = self.store.write().await;
            let pending = self.pending.read().await;
            let mut appended = Vec::new();
            for wire in incoming {
                let id = match wire.id {
                    Some(id) => id,
                    None => continue,
                };
                if store.contains(&id) {
                    continue;
                }
                if pending.contains(&id) {
                    continue;
                }
                let message = Message {
                    id,
                    content: wire.content,
                    timestamp: wire.timestamp,
                    sender_is_self: wire.is_me,
                    is_read: wire.is_read,
                    state: DeliveryState::Confirmed,
                };
                if store.append(message.clone()) {
                    appended.push(message);
                }
            }
            appended
        };

        if appended.is_empty() {
            return;
        }

        for message in &appended {
            self.view.message_appended(message);
        }
        if let Some(last) = appended.last() {
            self.session.advance_cursor(generation, &last.id).await;
        }
        if !self.user_scrolling.load(Ordering::SeqCst) {
            self.view.scroll_to_newest();
        }
    }
}

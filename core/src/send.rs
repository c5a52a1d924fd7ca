/// Optimistic send pipeline: Pending -> Confirmed | Failed.
///
/// One send in flight at a time; the guard clears unconditionally so a
/// failure never wedges the pipeline.
use crate::error::{ChatError, Result};
use crate::session::Session;
use crate::store::{MessageStore, PendingRegistry};
use crate::transport::ChatTransport;
use crate::types::{DeliveryState, Message};
use crate::view::ChatView;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub struct SendPipeline {
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn ChatView>,
    store: Arc<RwLock<MessageStore>>,
    pending: Arc<RwLock<PendingRegistry>>,
    session: Arc<Session>,
    in_flight: AtomicBool,
}

impl SendPipeline {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn ChatView>,
        store: Arc<RwLock<MessageStore>>,
        pending: Arc<RwLock<PendingRegistry>>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            transport,
            view,
            store,
            pending,
            session,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit user input against the active conversation.
    ///
    /// Empty content, no active conversation, a send already in flight, and
    /// content identical to a tracked pending entry all abort silently
    /// before any network call.
    pub async fn submit(&self, content: &str) -> Result<()> {
        self.submit_attempt(content, 1).await
    }

    /// Retry a failed entry: the old identifier is discarded and the
    /// content re-enters the pipeline as a fresh attempt.
    pub async fn retry(&self, temp_id: &str) -> Result<()> {
        // Checked before the failed entry is discarded; otherwise a retry
        // raced against an in-flight send would drop the content on the floor.
        if self.in_flight.load(Ordering::SeqCst) {
            return Err(ChatError::Validation(
                "another send is already in flight".to_string(),
            ));
        }
        let entry = {
            let mut pending = self.pending.write().await;
            match pending.get(temp_id) {
                Some(e) if e.message.state == DeliveryState::Failed => pending.remove(temp_id),
                _ => None,
            }
        };
        let entry = match entry {
            Some(e) => e,
            None => {
                return Err(ChatError::Validation(format!(
                    "no failed message with id {}",
                    temp_id
                )))
            }
        };
        {
            let mut store = self.store.write().await;
            store.remove(temp_id);
        }
        self.submit_attempt(&entry.message.content, entry.attempts + 1).await
    }

    async fn submit_attempt(&self, content: &str, attempt: u32) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            debug!("dropping empty submission");
            return Ok(());
        }
        let (peer_id, generation) = match self.session.dispatch_tag().await {
            Some(tag) => tag,
            None => {
                debug!("dropping submission without an active conversation");
                return Ok(());
            }
        };
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("send already in flight, dropping submission");
            return Ok(());
        }
        let result = self.dispatch(&peer_id, generation, content, attempt).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn dispatch(
        &self,
        peer_id: &str,
        generation: u64,
        content: &str,
        attempt: u32,
    ) -> Result<()> {
        {
            let pending = self.pending.read().await;
            if pending.has_content(content) {
                debug!("identical content already pending, dropping submission");
                return Ok(());
            }
        }

        let message = Message {
            id: temp_message_id(),
            content: content.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            sender_is_self: true,
            is_read: false,
            state: DeliveryState::Pending,
        };
        let temp_id = message.id.clone();
        {
            let mut store = self.store.write().await;
            store.append(message.clone());
        }
        {
            let mut pending = self.pending.write().await;
            pending.insert(message.clone(), attempt);
        }
        self.view.message_appended(&message);
        self.view.input_cleared();
        self.view.scroll_to_newest();

        match self.transport.send_message(peer_id, content, &temp_id).await {
            Ok(response) => match response.message_id {
                Some(message_id) => {
                    self.confirm(&temp_id, &message_id, response.timestamp, response.is_read, generation)
                        .await;
                    Ok(())
                }
                None => {
                    warn!("send response for {} missing message_id", temp_id);
                    self.fail(&temp_id).await;
                    Ok(())
                }
            },
            Err(e) => {
                warn!("send of {} failed: {}", temp_id, e);
                self.fail(&temp_id).await;
                Ok(())
            }
        }
    }

    /// Reconcile a confirmation. Replaying one for an already-confirmed
    /// temp id is a no-op; a confirmation arriving after a conversation
    /// switch still settles the entry but leaves the new cursor alone.
    pub async fn confirm(
        &self,
        temp_id: &str,
        message_id: &str,
        timestamp: Option<String>,
        is_read: bool,
        generation: u64,
    ) {
        let confirmed = {
            let mut store = self.store.write().await;
            store.confirm(temp_id, message_id, timestamp, is_read)
        };
        if !confirmed {
            debug!("ignoring replayed confirmation for {}", temp_id);
            return;
        }
        {
            let mut pending = self.pending.write().await;
            pending.remove(temp_id);
        }
        self.session.advance_cursor(generation, message_id).await;
        let message = {
            let store = self.store.read().await;
            store.get(message_id).cloned()
        };
        if let Some(message) = message {
            self.view.message_confirmed(temp_id, &message);
        }
    }

    async fn fail(&self, temp_id: &str) {
        {
            let mut store = self.store.write().await;
            store.mark_failed(temp_id);
        }
        {
            let mut pending = self.pending.write().await;
            pending.mark_failed(temp_id);
        }
        self.view.message_failed(temp_id);
    }
}

/// Collision-resistant temporary id: wall-clock millis + random suffix
fn temp_message_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("temp-{}-{}", millis, suffix.to_lowercase())
}

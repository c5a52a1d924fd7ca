/// The conversation switch controller and engine facade.
///
/// Owns the session (phase, cursor, generation), the single polling ticker,
/// and the scroll-idle flag; composes the send pipeline, the polling
/// synchronizer, the typing coordinator, and the user search.
use crate::config::Config;
use crate::error::Result;
use crate::poll::PollSynchronizer;
use crate::search::UserSearch;
use crate::send::SendPipeline;
use crate::session::{Phase, Session};
use crate::store::{MessageStore, PendingRegistry};
use crate::transport::ChatTransport;
use crate::types::{DeliveryState, Message, PeerProfile};
use crate::typing::TypingCoordinator;
use crate::utils::debounce::Debouncer;
use crate::utils::ticker::Ticker;
use crate::view::ChatView;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct ChatClient {
    config: Config,
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn ChatView>,
    store: Arc<RwLock<MessageStore>>,
    pending: Arc<RwLock<PendingRegistry>>,
    session: Arc<Session>,
    send: SendPipeline,
    poll: Arc<PollSynchronizer>,
    typing: Arc<TypingCoordinator>,
    search: UserSearch,
    ticker: Mutex<Option<Ticker>>,
    user_scrolling: Arc<AtomicBool>,
    scroll_debounce: Debouncer,
}

impl ChatClient {
    pub fn new(
        config: Config,
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn ChatView>,
    ) -> Self {
        let store = Arc::new(RwLock::new(MessageStore::new()));
        let pending = Arc::new(RwLock::new(PendingRegistry::new()));
        let session = Arc::new(Session::new());
        let user_scrolling = Arc::new(AtomicBool::new(false));

        let send = SendPipeline::new(
            transport.clone(),
            view.clone(),
            store.clone(),
            pending.clone(),
            session.clone(),
        );
        let poll = Arc::new(PollSynchronizer::new(
            transport.clone(),
            view.clone(),
            store.clone(),
            pending.clone(),
            session.clone(),
            user_scrolling.clone(),
        ));
        let typing = Arc::new(TypingCoordinator::new(
            transport.clone(),
            view.clone(),
            session.clone(),
            config.typing_debounce,
        ));
        let search = UserSearch::new(
            transport.clone(),
            view.clone(),
            config.search_debounce,
            config.min_search_len,
        );
        let scroll_debounce = Debouncer::new(config.scroll_idle);

        Self {
            config,
            transport,
            view,
            store,
            pending,
            session,
            send,
            poll,
            typing,
            search,
            ticker: Mutex::new(None),
            user_scrolling,
            scroll_debounce,
        }
    }

    /// Select a peer. Reselecting the active peer only refreshes the
    /// highlight; anything else stops the running ticker, reloads history,
    /// and restarts the cadence against the new conversation.
    pub async fn open_conversation(&self, peer_id: &str) -> Result<()> {
        if self.session.phase().await == Phase::Active
            && self.session.peer_id().await.as_deref() == Some(peer_id)
        {
            self.view.conversation_highlighted(peer_id);
            return Ok(());
        }

        self.stop_ticker();
        self.typing.reset();
        let generation = self.session.begin_loading(peer_id).await;
        self.view.conversation_highlighted(peer_id);
        info!("opening conversation with {}", peer_id);

        let history = match self.transport.fetch_history(peer_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!("history fetch for {} failed: {}", peer_id, e);
                self.session.reset(generation).await;
                self.view.history_failed(peer_id, &e.to_string());
                return Err(e);
            }
        };
        if self.session.generation().await != generation {
            debug!("dropping stale history for {}", peer_id);
            return Ok(());
        }

        let peer = history
            .other_user
            .unwrap_or_else(|| PeerProfile::bare(peer_id));

        // Cursor comes from the server's list, not from preserved locals.
        let last_seen = history
            .messages
            .iter()
            .rev()
            .find_map(|m| m.id.clone());

        let messages = {
            let mut store = self.store.write().await;
            let pending = self.pending.read().await;
            let locals = store.take_local_unconfirmed();
            for wire in history.messages {
                let id = match wire.id {
                    Some(id) => id,
                    None => continue,
                };
                if store.contains(&id) || pending.contains(&id) {
                    continue;
                }
                store.append(Message {
                    id,
                    content: wire.content,
                    timestamp: wire.timestamp,
                    sender_is_self: wire.is_me,
                    is_read: wire.is_read,
                    state: DeliveryState::Confirmed,
                });
            }
            for local in locals {
                store.append(local);
            }
            store.messages().to_vec()
        };

        if !self.session.activate(generation, last_seen).await {
            debug!("conversation with {} superseded during load", peer_id);
            return Ok(());
        }
        self.view.history_loaded(&peer, &messages);
        self.start_ticker();
        Ok(())
    }

    fn start_ticker(&self) {
        let poll = self.poll.clone();
        let typing = self.typing.clone();
        let ticker = Ticker::spawn(self.config.poll_interval, move || {
            let poll = poll.clone();
            let typing = typing.clone();
            async move {
                poll.tick().await;
                typing.query_tick().await;
            }
        });
        if let Ok(mut slot) = self.ticker.lock() {
            if let Some(previous) = slot.replace(ticker) {
                previous.stop();
            }
        }
    }

    fn stop_ticker(&self) {
        if let Ok(mut slot) = self.ticker.lock() {
            if let Some(ticker) = slot.take() {
                ticker.stop();
            }
        }
    }

    /// True while the polling cadence is running.
    pub fn is_polling(&self) -> bool {
        match self.ticker.lock() {
            Ok(slot) => slot.as_ref().map(|t| !t.is_stopped()).unwrap_or(false),
            Err(_) => false,
        }
    }

    // ─── Messaging ───────────────────────────────────────────────────────────

    pub async fn submit(&self, content: &str) -> Result<()> {
        self.send.submit(content).await
    }

    pub async fn retry(&self, temp_id: &str) -> Result<()> {
        self.send.retry(temp_id).await
    }

    /// Composer input event; drives the typing signal.
    pub async fn notify_input(&self) {
        self.typing.notify_input().await;
    }

    /// Viewport scroll event; suppresses auto-scroll until idle.
    pub fn notify_scroll(&self) {
        self.user_scrolling.store(true, Ordering::SeqCst);
        let flag = self.user_scrolling.clone();
        self.scroll_debounce.call(async move {
            flag.store(false, Ordering::SeqCst);
        });
    }

    pub fn search(&self, query: &str) {
        self.search.input(query);
    }

    /// One poll cycle, for hosts that drive their own cadence.
    pub async fn poll_once(&self) {
        self.poll.tick().await;
    }

    /// One remote typing query, for hosts that drive their own cadence.
    pub async fn typing_query_once(&self) {
        self.typing.query_tick().await;
    }

    // ─── Maintenance operations ──────────────────────────────────────────────

    pub async fn unread_count(&self) -> Result<u64> {
        let count = self.transport.unread_count().await?;
        self.view.unread_badge(count);
        Ok(count)
    }

    pub async fn delete_conversation(&self, peer_id: &str) -> Result<()> {
        self.transport.delete_conversation(peer_id).await?;
        if self.session.peer_id().await.as_deref() == Some(peer_id) {
            let mut store = self.store.write().await;
            store.clear();
            let mut pending = self.pending.write().await;
            pending.clear();
        }
        Ok(())
    }

    pub async fn mark_unread(&self, peer_id: &str) -> Result<()> {
        self.transport.mark_unread(peer_id).await
    }

    // ─── State accessors ─────────────────────────────────────────────────────

    pub async fn phase(&self) -> Phase {
        self.session.phase().await
    }

    pub async fn active_peer(&self) -> Option<String> {
        self.session.peer_id().await
    }

    pub async fn cursor(&self) -> Option<String> {
        self.session.cursor().await
    }

    /// Snapshot of the current view, in order.
    pub async fn messages(&self) -> Vec<Message> {
        self.store.read().await.messages().to_vec()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

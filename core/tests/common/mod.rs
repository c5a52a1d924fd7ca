#![allow(dead_code)]
/// Shared test fixtures: a scripted transport and a recording view.
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tidemark_core::error::Result;
use tidemark_core::transport::{
    ChatTransport, HistoryResponse, SendResponse, TypingStatus, UpdatesResponse, UserSummary,
    WireMessage,
};
use tidemark_core::types::{Message, PeerProfile};
use tidemark_core::view::ChatView;
use tidemark_core::{ChatClient, Config};

// ─── Scripted transport ──────────────────────────────────────────────────────

/// Responses are scripted per endpoint; when a queue is empty a benign
/// default is served. Optional per-endpoint delays let tests stage races
/// under the paused clock. Queued responses are claimed before the delay,
/// so a slow call keeps its script even if later calls overtake it.
pub struct MockTransport {
    pub send_responses: Mutex<VecDeque<Result<SendResponse>>>,
    pub history_responses: Mutex<VecDeque<Result<HistoryResponse>>>,
    pub poll_responses: Mutex<VecDeque<Result<UpdatesResponse>>>,
    pub peer_typing: AtomicBool,
    pub users: Mutex<Vec<UserSummary>>,
    pub unread: AtomicU64,

    pub send_delay: Mutex<Duration>,
    pub history_delay: Mutex<Duration>,
    pub poll_delay: Mutex<Duration>,

    pub send_calls: Mutex<Vec<(String, String, String)>>,
    pub history_calls: Mutex<Vec<String>>,
    pub poll_calls: Mutex<Vec<(String, Option<String>)>>,
    pub typing_emits: Mutex<Vec<(String, bool)>>,
    pub typing_queries: Mutex<Vec<String>>,
    pub search_calls: Mutex<Vec<String>>,
    pub delete_calls: Mutex<Vec<String>>,
    pub mark_unread_calls: Mutex<Vec<String>>,

    next_id: AtomicU64,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            send_responses: Mutex::new(VecDeque::new()),
            history_responses: Mutex::new(VecDeque::new()),
            poll_responses: Mutex::new(VecDeque::new()),
            peer_typing: AtomicBool::new(false),
            users: Mutex::new(Vec::new()),
            unread: AtomicU64::new(0),
            send_delay: Mutex::new(Duration::ZERO),
            history_delay: Mutex::new(Duration::ZERO),
            poll_delay: Mutex::new(Duration::ZERO),
            send_calls: Mutex::new(Vec::new()),
            history_calls: Mutex::new(Vec::new()),
            poll_calls: Mutex::new(Vec::new()),
            typing_emits: Mutex::new(Vec::new()),
            typing_queries: Mutex::new(Vec::new()),
            search_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            mark_unread_calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(100),
        })
    }

    pub fn queue_send(&self, response: Result<SendResponse>) {
        self.send_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_history(&self, response: Result<HistoryResponse>) {
        self.history_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_poll(&self, response: Result<UpdatesResponse>) {
        self.poll_responses.lock().unwrap().push_back(response);
    }

    pub fn set_poll_delay(&self, delay: Duration) {
        *self.poll_delay.lock().unwrap() = delay;
    }

    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = delay;
    }

    pub fn send_call_count(&self) -> usize {
        self.send_calls.lock().unwrap().len()
    }

    pub fn poll_call_count(&self) -> usize {
        self.poll_calls.lock().unwrap().len()
    }

    pub fn history_call_count(&self) -> usize {
        self.history_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_message(
        &self,
        recipient_id: &str,
        content: &str,
        temp_id: &str,
    ) -> Result<SendResponse> {
        self.send_calls.lock().unwrap().push((
            recipient_id.to_string(),
            content.to_string(),
            temp_id.to_string(),
        ));
        let scripted = self.send_responses.lock().unwrap().pop_front();
        let delay = *self.send_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match scripted {
            Some(response) => response,
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                Ok(SendResponse {
                    message_id: Some(id.to_string()),
                    timestamp: Some("2024-01-01T00:00:00Z".to_string()),
                    is_read: false,
                })
            }
        }
    }

    async fn fetch_history(&self, peer_id: &str) -> Result<HistoryResponse> {
        self.history_calls.lock().unwrap().push(peer_id.to_string());
        let scripted = self.history_responses.lock().unwrap().pop_front();
        let delay = *self.history_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match scripted {
            Some(response) => response,
            None => Ok(history(peer_id, vec![])),
        }
    }

    async fn poll_updates(
        &self,
        peer_id: &str,
        last_seen_id: Option<&str>,
    ) -> Result<UpdatesResponse> {
        self.poll_calls
            .lock()
            .unwrap()
            .push((peer_id.to_string(), last_seen_id.map(String::from)));
        let scripted = self.poll_responses.lock().unwrap().pop_front();
        let delay = *self.poll_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match scripted {
            Some(response) => response,
            None => Ok(UpdatesResponse { messages: vec![] }),
        }
    }

    async fn emit_typing(&self, recipient_id: &str, is_typing: bool) -> Result<()> {
        self.typing_emits
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), is_typing));
        Ok(())
    }

    async fn typing_status(&self, peer_id: &str) -> Result<TypingStatus> {
        self.typing_queries.lock().unwrap().push(peer_id.to_string());
        Ok(TypingStatus {
            is_typing: self.peer_typing.load(Ordering::SeqCst),
        })
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>> {
        self.search_calls.lock().unwrap().push(query.to_string());
        Ok(self.users.lock().unwrap().clone())
    }

    async fn unread_count(&self) -> Result<u64> {
        Ok(self.unread.load(Ordering::SeqCst))
    }

    async fn delete_conversation(&self, peer_id: &str) -> Result<()> {
        self.delete_calls.lock().unwrap().push(peer_id.to_string());
        Ok(())
    }

    async fn mark_unread(&self, peer_id: &str) -> Result<()> {
        self.mark_unread_calls
            .lock()
            .unwrap()
            .push(peer_id.to_string());
        Ok(())
    }
}

// ─── Recording view ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Appended(String),
    Confirmed(String, String),
    Failed(String),
    HistoryLoaded(String, usize),
    HistoryFailed(String),
    Highlighted(String),
    Typing(String, bool),
    InputCleared,
    ScrollToNewest,
    SearchResults(usize),
    UnreadBadge(u64),
}

#[derive(Default)]
pub struct RecordingView {
    pub events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &ViewEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }

    pub fn count_scrolls(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == ViewEvent::ScrollToNewest)
            .count()
    }
}

impl ChatView for RecordingView {
    fn message_appended(&self, message: &Message) {
        self.push(ViewEvent::Appended(message.id.clone()));
    }

    fn message_confirmed(&self, temp_id: &str, message: &Message) {
        self.push(ViewEvent::Confirmed(temp_id.to_string(), message.id.clone()));
    }

    fn message_failed(&self, temp_id: &str) {
        self.push(ViewEvent::Failed(temp_id.to_string()));
    }

    fn history_loaded(&self, peer: &PeerProfile, messages: &[Message]) {
        self.push(ViewEvent::HistoryLoaded(peer.id.clone(), messages.len()));
    }

    fn history_failed(&self, peer_id: &str, _reason: &str) {
        self.push(ViewEvent::HistoryFailed(peer_id.to_string()));
    }

    fn conversation_highlighted(&self, peer_id: &str) {
        self.push(ViewEvent::Highlighted(peer_id.to_string()));
    }

    fn typing_indicator(&self, peer_id: &str, is_typing: bool) {
        self.push(ViewEvent::Typing(peer_id.to_string(), is_typing));
    }

    fn input_cleared(&self) {
        self.push(ViewEvent::InputCleared);
    }

    fn scroll_to_newest(&self) {
        self.push(ViewEvent::ScrollToNewest);
    }

    fn search_results(&self, users: &[UserSummary]) {
        self.push(ViewEvent::SearchResults(users.len()));
    }

    fn unread_badge(&self, count: u64) {
        self.push(ViewEvent::UnreadBadge(count));
    }
}

// ─── Builders ────────────────────────────────────────────────────────────────

pub fn wire(id: &str, content: &str, is_me: bool) -> WireMessage {
    WireMessage {
        id: Some(id.to_string()),
        content: content.to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        is_read: false,
        is_me,
    }
}

pub fn wire_without_id(content: &str) -> WireMessage {
    WireMessage {
        id: None,
        content: content.to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        is_read: false,
        is_me: false,
    }
}

pub fn updates(ids: &[&str]) -> UpdatesResponse {
    UpdatesResponse {
        messages: ids.iter().map(|id| wire(id, "msg", false)).collect(),
    }
}

pub fn history(peer_id: &str, messages: Vec<WireMessage>) -> HistoryResponse {
    HistoryResponse {
        error: None,
        other_user: Some(PeerProfile {
            id: peer_id.to_string(),
            username: format!("user{}", peer_id),
            full_name: String::new(),
        }),
        messages,
    }
}

pub fn user(id: &str, username: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        username: username.to_string(),
        full_name: String::new(),
        email: String::new(),
    }
}

/// Default test config parks the poll cadence far out so the background
/// ticker cannot race tests that drive cycles by hand via poll_once().
pub fn test_config() -> Config {
    Config {
        base_url: "http://127.0.0.1:8000/chat/".to_string(),
        poll_interval: Duration::from_secs(3600),
        ..Default::default()
    }
}

pub fn make_client() -> (Arc<ChatClient>, Arc<MockTransport>, Arc<RecordingView>) {
    make_client_with(test_config())
}

pub fn make_client_with(
    config: Config,
) -> (Arc<ChatClient>, Arc<MockTransport>, Arc<RecordingView>) {
    let transport = MockTransport::new();
    let view = RecordingView::new();
    let client = Arc::new(ChatClient::new(config, transport.clone(), view.clone()));
    (client, transport, view)
}

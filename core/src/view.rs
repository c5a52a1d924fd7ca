/// View seam: render callbacks the engine invokes after each mutation.
///
/// The engine owns all message state; implementations only render what they
/// are handed. Every callback fires after the store mutation it describes
/// has completed, and never from inside a lock.
use crate::transport::UserSummary;
use crate::types::{Message, PeerProfile};

pub trait ChatView: Send + Sync {
    /// A new message entered the view (optimistic local or polled remote).
    fn message_appended(&self, _message: &Message) {}

    /// A pending entry was confirmed; `message` carries the server id.
    fn message_confirmed(&self, _temp_id: &str, _message: &Message) {}

    /// A send failed; the entry stays visible with a retry affordance.
    fn message_failed(&self, _temp_id: &str) {}

    /// History for a freshly-opened conversation, in view order.
    fn history_loaded(&self, _peer: &PeerProfile, _messages: &[Message]) {}

    /// History fetch failed; the conversation did not open.
    fn history_failed(&self, _peer_id: &str, _reason: &str) {}

    /// Selection highlight, including same-peer reselection.
    fn conversation_highlighted(&self, _peer_id: &str) {}

    /// Remote typing affordance: show on true, remove on false.
    fn typing_indicator(&self, _peer_id: &str, _is_typing: bool) {}

    /// The composer input was consumed by a submission.
    fn input_cleared(&self) {}

    /// Jump the viewport to the newest message.
    fn scroll_to_newest(&self) {}

    /// Results for the peer-directory search.
    fn search_results(&self, _users: &[UserSummary]) {}

    /// Total unread count across conversations.
    fn unread_badge(&self, _count: u64) {}
}

/// Headless view for embedding and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ChatView for NullView {}

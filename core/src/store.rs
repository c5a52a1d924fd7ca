/// In-memory message collection for the active conversation.
/// Ordered, id-indexed, discarded on conversation switch.
use crate::types::{DeliveryState, Message};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    index: HashMap<String, usize>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&i| &self.messages[i])
    }

    /// Messages in view order (server order, locals appended last)
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message, rejecting duplicate identifiers.
    /// Returns false if an entry with this id already exists.
    pub fn append(&mut self, message: Message) -> bool {
        if self.index.contains_key(&message.id) {
            return false;
        }
        self.index.insert(message.id.clone(), self.messages.len());
        self.messages.push(message);
        true
    }

    /// Replace a pending entry's temporary id with its server id in place.
    ///
    /// Returns false (a no-op) when the temporary id is unknown (a replayed
    /// confirmation) or when the server id is already present in the store.
    pub fn confirm(
        &mut self,
        temp_id: &str,
        message_id: &str,
        timestamp: Option<String>,
        is_read: bool,
    ) -> bool {
        if self.index.contains_key(message_id) {
            return false;
        }
        let slot = match self.index.remove(temp_id) {
            Some(slot) => slot,
            None => return false,
        };
        let message = &mut self.messages[slot];
        message.id = message_id.to_string();
        if let Some(ts) = timestamp {
            message.timestamp = ts;
        }
        message.is_read = is_read;
        message.state = DeliveryState::Confirmed;
        self.index.insert(message_id.to_string(), slot);
        true
    }

    /// Mark a locally-originated entry as failed; the entry stays in the
    /// view so retry remains possible.
    pub fn mark_failed(&mut self, id: &str) -> bool {
        match self.index.get(id) {
            Some(&slot) => {
                self.messages[slot].state = DeliveryState::Failed;
                true
            }
            None => false,
        }
    }

    /// Remove an entry entirely (retry discards the failed attempt).
    pub fn remove(&mut self, id: &str) -> Option<Message> {
        let slot = self.index.remove(id)?;
        let message = self.messages.remove(slot);
        for (i, m) in self.messages.iter().enumerate().skip(slot) {
            self.index.insert(m.id.clone(), i);
        }
        Some(message)
    }

    /// Drop everything except unconfirmed local entries, returning them.
    /// Used when a history reload replaces the view: pending and failed
    /// sends survive the reload.
    pub fn take_local_unconfirmed(&mut self) -> Vec<Message> {
        let kept: Vec<Message> = self
            .messages
            .drain(..)
            .filter(|m| m.sender_is_self && m.state != DeliveryState::Confirmed)
            .collect();
        self.index.clear();
        kept
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.index.clear();
    }
}

/// One optimistic send being tracked until the server answers
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub message: Message,
    /// 1 for the first submission, incremented by each retry
    pub attempts: u32,
}

/// Tracks in-flight optimistic sends by temporary id
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: HashMap<String, PendingEntry>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, temp_id: &str) -> bool {
        self.entries.contains_key(temp_id)
    }

    pub fn get(&self, temp_id: &str) -> Option<&PendingEntry> {
        self.entries.get(temp_id)
    }

    /// Anti-double-submit guard: true if any tracked entry carries
    /// exactly this content.
    pub fn has_content(&self, content: &str) -> bool {
        self.entries.values().any(|e| e.message.content == content)
    }

    pub fn insert(&mut self, message: Message, attempts: u32) {
        self.entries
            .insert(message.id.clone(), PendingEntry { message, attempts });
    }

    pub fn remove(&mut self, temp_id: &str) -> Option<PendingEntry> {
        self.entries.remove(temp_id)
    }

    pub fn mark_failed(&mut self, temp_id: &str) -> bool {
        match self.entries.get_mut(temp_id) {
            Some(entry) => {
                entry.message.state = DeliveryState::Failed;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Message store and pending registry invariants
use tidemark_core::store::{MessageStore, PendingRegistry};
use tidemark_core::types::{DeliveryState, Message};

fn local(id: &str, content: &str, state: DeliveryState) -> Message {
    Message {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        sender_is_self: true,
        is_read: false,
        state,
    }
}

fn remote(id: &str, content: &str) -> Message {
    Message {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        sender_is_self: false,
        is_read: false,
        state: DeliveryState::Confirmed,
    }
}

#[test]
fn append_rejects_duplicate_identifiers() {
    let mut store = MessageStore::new();
    assert!(store.append(remote("7", "first")));
    assert!(!store.append(remote("7", "second")));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("7").unwrap().content, "first");
}

#[test]
fn confirm_replaces_identifier_in_place() {
    let mut store = MessageStore::new();
    store.append(remote("5", "earlier"));
    store.append(local("temp-1-abc", "hi", DeliveryState::Pending));

    let confirmed = store.confirm(
        "temp-1-abc",
        "42",
        Some("2024-01-01T00:00:05Z".to_string()),
        false,
    );
    assert!(confirmed);

    // Same slot, new identity, confirmed state
    let ids: Vec<&str> = store.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["5", "42"]);
    let message = store.get("42").unwrap();
    assert_eq!(message.state, DeliveryState::Confirmed);
    assert_eq!(message.timestamp, "2024-01-01T00:00:05Z");
    assert!(!store.contains("temp-1-abc"));
}

#[test]
fn confirm_replay_is_a_noop() {
    let mut store = MessageStore::new();
    store.append(local("temp-1-abc", "hi", DeliveryState::Pending));

    assert!(store.confirm("temp-1-abc", "42", None, false));
    assert!(!store.confirm("temp-1-abc", "42", None, true));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("42").unwrap().is_read, false);
}

#[test]
fn confirm_refuses_when_server_id_already_present() {
    let mut store = MessageStore::new();
    store.append(remote("42", "already here"));
    store.append(local("temp-1-abc", "hi", DeliveryState::Pending));

    assert!(!store.confirm("temp-1-abc", "42", None, false));
    assert_eq!(store.len(), 2);
    assert!(store.contains("temp-1-abc"));
}

#[test]
fn remove_keeps_index_consistent() {
    let mut store = MessageStore::new();
    store.append(remote("1", "a"));
    store.append(remote("2", "b"));
    store.append(remote("3", "c"));

    assert_eq!(store.remove("2").unwrap().content, "b");
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("3").unwrap().content, "c");
    assert!(!store.contains("2"));

    // Appending after removal must not collide with shifted slots
    assert!(store.append(remote("4", "d")));
    let ids: Vec<&str> = store.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3", "4"]);
}

#[test]
fn history_reload_preserves_unconfirmed_locals_only() {
    let mut store = MessageStore::new();
    store.append(remote("1", "old history"));
    store.append(local("10", "confirmed send", DeliveryState::Confirmed));
    store.append(local("temp-1-abc", "pending send", DeliveryState::Pending));
    store.append(local("temp-2-def", "failed send", DeliveryState::Failed));

    let kept = store.take_local_unconfirmed();
    assert!(store.is_empty());
    let kept_ids: Vec<&str> = kept.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(kept_ids, vec!["temp-1-abc", "temp-2-def"]);
}

#[test]
fn registry_content_dedup_and_failure_marking() {
    let mut registry = PendingRegistry::new();
    registry.insert(local("temp-1-abc", "hello", DeliveryState::Pending), 1);

    assert!(registry.has_content("hello"));
    assert!(!registry.has_content("hello there"));
    assert!(registry.contains("temp-1-abc"));

    assert!(registry.mark_failed("temp-1-abc"));
    assert_eq!(
        registry.get("temp-1-abc").unwrap().message.state,
        DeliveryState::Failed
    );

    let entry = registry.remove("temp-1-abc").unwrap();
    assert_eq!(entry.attempts, 1);
    assert!(registry.is_empty());
    assert!(!registry.has_content("hello"));
}

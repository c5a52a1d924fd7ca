/// tidemark - client-side synchronization engine for a polled DM surface
///
/// Optimistic sends with temporary-id reconciliation, cursor-based
/// incremental polling, and debounced typing presence, all behind an
/// abstract JSON-request transport.

pub mod cli_app;
pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod search;
pub mod send;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;
pub mod typing;
pub mod utils;
pub mod view;

pub use client::ChatClient;
pub use config::Config;
pub use error::{ChatError, Result};
pub use session::Phase;

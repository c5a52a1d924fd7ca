/// Configuration management
use crate::error::{ChatError, Result};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_TYPING_DEBOUNCE_MS: u64 = 2000;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const DEFAULT_SCROLL_IDLE_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the conversation endpoints (e.g. `http://host/chat/`)
    pub base_url: String,

    /// Cadence of the update synchronizer
    pub poll_interval: Duration,

    /// Trailing debounce for the local typing signal
    pub typing_debounce: Duration,

    /// Debounce for the peer-directory search input
    pub search_debounce: Duration,

    /// Idle window after which the "user is scrolling" flag clears
    pub scroll_idle: Duration,

    /// Minimum query length before a search request is issued
    pub min_search_len: usize,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Cookie holding the anti-forgery token
    pub csrf_cookie: String,

    /// Peer to open immediately on startup
    pub initial_peer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/chat/".to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            typing_debounce: Duration::from_millis(DEFAULT_TYPING_DEBOUNCE_MS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            scroll_idle: Duration::from_millis(DEFAULT_SCROLL_IDLE_MS),
            min_search_len: 2,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            initial_peer: None,
        }
    }
}

impl Config {
    /// Create config from command line arguments
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() < 2 {
            return Err(ChatError::Config(format!(
                "Usage: {} <base_url> [--peer <id>] [--poll-ms <n>] [--typing-debounce-ms <n>] [--search-debounce-ms <n>] [--timeout-ms <n>] [--csrf-cookie <name>]",
                args.first().unwrap_or(&"tidemark".to_string())
            )));
        }

        let mut config = Config {
            base_url: normalize_base_url(&args[1]),
            ..Default::default()
        };

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--peer" => {
                    let id = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--peer requires a peer id argument".to_string())
                    })?;
                    config.initial_peer = Some(id.clone());
                    i += 2;
                }
                "--poll-ms" => {
                    config.poll_interval = Duration::from_millis(parse_ms(args, i, "--poll-ms")?);
                    i += 2;
                }
                "--typing-debounce-ms" => {
                    config.typing_debounce =
                        Duration::from_millis(parse_ms(args, i, "--typing-debounce-ms")?);
                    i += 2;
                }
                "--search-debounce-ms" => {
                    config.search_debounce =
                        Duration::from_millis(parse_ms(args, i, "--search-debounce-ms")?);
                    i += 2;
                }
                "--timeout-ms" => {
                    config.request_timeout =
                        Duration::from_millis(parse_ms(args, i, "--timeout-ms")?);
                    i += 2;
                }
                "--csrf-cookie" => {
                    let name = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--csrf-cookie requires a cookie name".to_string())
                    })?;
                    config.csrf_cookie = name.clone();
                    i += 2;
                }
                other => {
                    return Err(ChatError::Config(format!("Unknown argument: {}", other)));
                }
            }
        }

        // Env overrides (nice for scripts)
        if let Some(ms) = std::env::var("TIDEMARK_POLL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Ok(name) = std::env::var("TIDEMARK_CSRF_COOKIE") {
            config.csrf_cookie = name;
        }

        Ok(config)
    }
}

fn parse_ms(args: &[String], i: usize, flag: &str) -> Result<u64> {
    let value = args
        .get(i + 1)
        .ok_or_else(|| ChatError::Config(format!("{} requires a millisecond value", flag)))?;
    value
        .parse::<u64>()
        .map_err(|_| ChatError::Config(format!("{} must be a whole number of milliseconds", flag)))
}

fn normalize_base_url(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    }
}

/// Transport seam: the JSON operations the engine issues.
///
/// Endpoints (conversation-relative paths):
///   POST   send/                                  {recipient_id, content, temp_id}
///   GET    get/{peer_id}/                          full history
///   GET    updates/?user_id=&last_id=              messages newer than the cursor
///   POST   typing/                                 {recipient_id, is_typing}
///   GET    typing-status/?user_id=                 {is_typing}
///   GET    search-users/?q=                        {users: [...]}
///   GET    unread/                                 {unread_count}
///   DELETE delete/{peer_id}/
///   POST   mark-unread/{peer_id}/
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::types::PeerProfile;
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Ids arrive as JSON numbers (server-issued) or strings (temporary);
/// both normalize to the string form.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Str(String),
}

pub(crate) fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Num(n) => Ok(n.to_string()),
        RawId::Str(s) => Ok(s),
    }
}

fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Num(n)) => Some(n.to_string()),
        Some(RawId::Str(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// A message exactly as the server sends it
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    /// Absent on a malformed response; treated as a send failure
    #[serde(default, deserialize_with = "de_opt_id")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub other_user: Option<PeerProfile>,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// The `messages` field is required: its absence fails the decode, which
/// the poll path logs and ignores.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatesResponse {
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingStatus {
    #[serde(default)]
    pub is_typing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct UnreadResponse {
    #[serde(default)]
    unread_count: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The engine observes the server only through this seam.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(
        &self,
        recipient_id: &str,
        content: &str,
        temp_id: &str,
    ) -> Result<SendResponse>;

    async fn fetch_history(&self, peer_id: &str) -> Result<HistoryResponse>;

    async fn poll_updates(
        &self,
        peer_id: &str,
        last_seen_id: Option<&str>,
    ) -> Result<UpdatesResponse>;

    async fn emit_typing(&self, recipient_id: &str, is_typing: bool) -> Result<()>;

    async fn typing_status(&self, peer_id: &str) -> Result<TypingStatus>;

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>>;

    async fn unread_count(&self) -> Result<u64>;

    async fn delete_conversation(&self, peer_id: &str) -> Result<()>;

    async fn mark_unread(&self, peer_id: &str) -> Result<()>;
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// Production transport over reqwest. The anti-forgery token is read from
/// the cookie store and echoed in the X-CSRFToken header on every mutating
/// request; the engine never sees it.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
    csrf_cookie: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ChatError::Config(format!("Invalid base URL: {}", e)))?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(config.request_timeout)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| ChatError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            jar,
            csrf_cookie: config.csrf_cookie.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ChatError::Config(format!("Invalid request path {}: {}", path, e)))
    }

    fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let cookies = header.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name == self.csrf_cookie {
                Some(value.to_string())
            } else {
                None
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("GET {}: {}", path, e)))?;
        decode(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = self.csrf_token() {
            request = request.header("X-CSRFToken", token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("POST {}: {}", path, e)))?;
        decode(path, response).await
    }

    async fn delete_ok(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let mut request = self.client.delete(url);
        if let Some(token) = self.csrf_token() {
            request = request.header("X-CSRFToken", token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("DELETE {}: {}", path, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Transport(format!("DELETE {}: HTTP {}", path, status)));
        }
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ChatError::Transport(format!("{}: HTTP {}", path, status)));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ChatError::Format(format!("{}: {}", path, e)))
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(
        &self,
        recipient_id: &str,
        content: &str,
        temp_id: &str,
    ) -> Result<SendResponse> {
        self.post_json(
            "send/",
            &serde_json::json!({
                "recipient_id": recipient_id,
                "content": content,
                "temp_id": temp_id,
            }),
        )
        .await
    }

    async fn fetch_history(&self, peer_id: &str) -> Result<HistoryResponse> {
        let path = format!("get/{}/", urlencoding::encode(peer_id));
        let history: HistoryResponse = self.get_json(&path).await?;
        if let Some(error) = history.error.as_deref() {
            return Err(ChatError::Transport(format!("{}: {}", path, error)));
        }
        Ok(history)
    }

    async fn poll_updates(
        &self,
        peer_id: &str,
        last_seen_id: Option<&str>,
    ) -> Result<UpdatesResponse> {
        let path = format!(
            "updates/?user_id={}&last_id={}",
            urlencoding::encode(peer_id),
            urlencoding::encode(last_seen_id.unwrap_or(""))
        );
        self.get_json(&path).await
    }

    async fn emit_typing(&self, recipient_id: &str, is_typing: bool) -> Result<()> {
        let _: serde_json::Value = self
            .post_json(
                "typing/",
                &serde_json::json!({
                    "recipient_id": recipient_id,
                    "is_typing": is_typing,
                }),
            )
            .await?;
        Ok(())
    }

    async fn typing_status(&self, peer_id: &str) -> Result<TypingStatus> {
        let path = format!("typing-status/?user_id={}", urlencoding::encode(peer_id));
        self.get_json(&path).await
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>> {
        let path = format!("search-users/?q={}", urlencoding::encode(query));
        let response: SearchResponse = self.get_json(&path).await?;
        Ok(response.users)
    }

    async fn unread_count(&self) -> Result<u64> {
        let response: UnreadResponse = self.get_json("unread/").await?;
        Ok(response.unread_count)
    }

    async fn delete_conversation(&self, peer_id: &str) -> Result<()> {
        let path = format!("delete/{}/", urlencoding::encode(peer_id));
        self.delete_ok(&path).await
    }

    async fn mark_unread(&self, peer_id: &str) -> Result<()> {
        let path = format!("mark-unread/{}/", urlencoding::encode(peer_id));
        let _: serde_json::Value = self.post_json(&path, &serde_json::json!({})).await?;
        Ok(())
    }
}

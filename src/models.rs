// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::{ClientError, ClientResult};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }

    /// Class of the rendered bubble, e.g. `message user`.
    pub fn css_class(&self) -> String {
        format!("message {}", self.as_str())
    }
}

/// One chat turn as shown in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }
}

/// A rendered message node. `text` is kept verbatim and never parsed as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    pub class: String,
    pub text: String,
}

impl From<&Message> for MessageBubble {
    fn from(message: &Message) -> Self {
        Self {
            class: message.sender.css_class(),
            text: message.text.clone(),
        }
    }
}

/// Username and password read from a form for a single submission.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Structured outcome a server may send alongside `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failure,
}

/// The JSON body every endpoint answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<ResponseStatus>,
}

/// Strings pass through, truthy scalars become their text. `null`, `false`, `0`,
/// objects and arrays count as no message.
fn lenient_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

/// Unrecognised status values count as absent.
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ResponseStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if s == "success" => Some(ResponseStatus::Success),
        Value::String(s) if s == "failure" => Some(ResponseStatus::Failure),
        _ => None,
    })
}

impl ServerResponse {
    /// `message` when present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Raw status and body as returned by a `Backend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> ClientResult<ServerResponse> {
        serde_json::from_str(&self.body).map_err(|e| {
            ClientError::decode_error(format!("status {}: {}", self.status, e))
        })
    }
}

/// Logs details of each API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}

//! Chat message, transcript entry, and export types.
//!
//! A `Message` is immutable once created. The transcript stores messages as
//! `LogEntry` values, which additionally record whether the message took part
//! in a successful backend exchange (and is therefore eligible as request
//! context).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A message as stored in the conversation transcript.
///
/// `exchanged` is true only for messages that were part of a successful
/// backend round trip. Locally produced messages (fallback replies, the
/// welcome greeting, error notices) keep it false and are never sent as
/// request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default)]
    pub exchanged: bool,
}

impl LogEntry {
    pub fn exchanged(message: Message) -> Self {
        Self {
            message,
            exchanged: true,
        }
    }

    pub fn local(message: Message) -> Self {
        Self {
            message,
            exchanged: false,
        }
    }
}

/// Downloadable snapshot of the displayed transcript.
///
/// Field names follow the on-disk export format (`exportDate`,
/// `totalMessages`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    pub messages: Vec<Message>,
    pub export_date: DateTime<Utc>,
    pub total_messages: usize,
}

impl ChatExport {
    pub fn new(messages: Vec<Message>, export_date: DateTime<Utc>) -> Self {
        let total_messages = messages.len();
        Self {
            messages,
            export_date,
            total_messages,
        }
    }

    /// File name for an export taken on `date`: `davoodai-chat-YYYY-MM-DD.json`.
    pub fn file_name(date: NaiveDate) -> String {
        format!("davoodai-chat-{}.json", date.format("%Y-%m-%d"))
    }
}

use crate::routing::NodeName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable, caller-supplied identifier for one conversation (thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of the participant that authored a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The assistant-facing voice of the supervisor.
    Assistant,
    /// A system-level notice (rejections, routing failures).
    System,
    /// Output produced by a task node.
    Node,
}

/// A single message within a conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: Uuid,
    /// The role of the message author.
    pub role: Role,
    /// The task node this message originated from, for [`Role::Node`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<NodeName>,
    /// The textual content of the message.
    pub content: String,
    /// Optional structured payload attached by a task node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// UTC timestamp of when the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            origin: None,
            content: content.into(),
            payload: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new message with [`Role::Assistant`].
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new message with [`Role::System`].
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a new message attributed to a task node.
    pub fn node(origin: NodeName, content: impl Into<String>) -> Self {
        Self {
            origin: Some(origin),
            ..Self::new(Role::Node, content)
        }
    }

    /// Attaches a structured payload to the message.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Ordered, append-only sequence of messages for one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    /// Creates an empty conversation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message. Existing messages are never mutated.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The most recent user message, if any.
    pub fn latest_user(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Number of messages in the conversation.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation holds no messages yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

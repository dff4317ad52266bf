use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, or 0 if the clock is set before it.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One immutable item of a conversation feed.
///
/// Only [`Entry::Message`] carries an id. Message ids are the anchors used to
/// line up the live feed with paginated history; status entries are
/// synthesized locally and can never be anchors.
///
/// Serialized with an internal `"kind"` tag so the presentation layer can
/// switch on it directly:
///
/// ```
/// use feedfold::Entry;
/// use serde_json::json;
///
/// let entry = Entry::message("m1", "alice", json!({"text": "hi"}));
/// assert_eq!(entry.id(), Some("m1"));
/// assert!(entry.is_anchor());
///
/// let joined = Entry::user_joined("bob");
/// assert_eq!(joined.id(), None);
/// assert!(!joined.is_anchor());
///
/// let wire = serde_json::to_value(&entry).unwrap();
/// assert_eq!(wire["kind"], "message");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Message(Message),
    NodeStatus(NodeStatus),
    UserStatus(UserStatus),
}

/// A chat message delivered by a peer or loaded from history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct Message {
    /// Globally unique, server-assigned. Carries no ordering by value.
    pub id: String,

    pub sender_id: String,

    /// Milliseconds since the Unix epoch.
    pub created_at: u64,

    /// Opaque body. The engine never looks inside it.
    pub payload: Value,
}

/// A device of some user came online or went offline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct NodeStatus {
    pub node_id: String,
    pub user_id: String,
    pub created_at: u64,
    pub active: bool,
}

/// A user joined or left the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct UserStatus {
    pub user_id: String,
    pub created_at: u64,
    pub joined: bool,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(id: impl Into<String>, sender_id: impl Into<String>, payload: Value) -> Self {
        Message {
            id: id.into(),
            sender_id: sender_id.into(),
            created_at: now_millis(),
            payload,
        }
    }

    /// Override the creation timestamp (milliseconds).
    pub fn at(mut self, created_at: u64) -> Self {
        self.created_at = created_at;
        self
    }
}

impl Entry {
    /// Create a message entry stamped with the current time.
    pub fn message(id: impl Into<String>, sender_id: impl Into<String>, payload: Value) -> Self {
        Entry::Message(Message::new(id, sender_id, payload))
    }

    /// A user joined, stamped with the current time.
    pub fn user_joined(user_id: impl Into<String>) -> Self {
        Self::user_status(user_id, true)
    }

    /// A user left, stamped with the current time.
    pub fn user_left(user_id: impl Into<String>) -> Self {
        Self::user_status(user_id, false)
    }

    /// A device came online, stamped with the current time.
    pub fn node_active(node_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::node_status(node_id, user_id, true)
    }

    /// A device went offline, stamped with the current time.
    pub fn node_inactive(node_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::node_status(node_id, user_id, false)
    }

    /// Override the creation timestamp (milliseconds) of any entry, e.g. with
    /// the time the server recorded the event.
    ///
    /// ```
    /// use feedfold::Entry;
    ///
    /// let left = Entry::user_left("bob").at(1_700_000_000_000);
    /// assert_eq!(left.created_at(), 1_700_000_000_000);
    /// ```
    pub fn at(mut self, created_at: u64) -> Self {
        match &mut self {
            Entry::Message(msg) => msg.created_at = created_at,
            Entry::NodeStatus(status) => status.created_at = created_at,
            Entry::UserStatus(status) => status.created_at = created_at,
        }
        self
    }

    fn user_status(user_id: impl Into<String>, joined: bool) -> Self {
        Entry::UserStatus(UserStatus {
            user_id: user_id.into(),
            created_at: now_millis(),
            joined,
        })
    }

    fn node_status(node_id: impl Into<String>, user_id: impl Into<String>, active: bool) -> Self {
        Entry::NodeStatus(NodeStatus {
            node_id: node_id.into(),
            user_id: user_id.into(),
            created_at: now_millis(),
            active,
        })
    }

    /// The anchor id, present only for messages.
    pub fn id(&self) -> Option<&str> {
        match self {
            Entry::Message(msg) => Some(&msg.id),
            Entry::NodeStatus(_) | Entry::UserStatus(_) => None,
        }
    }

    /// Whether this entry can align two sequences (i.e. it is a message).
    pub fn is_anchor(&self) -> bool {
        matches!(self, Entry::Message(_))
    }

    /// Milliseconds since the Unix epoch.
    pub fn created_at(&self) -> u64 {
        match self {
            Entry::Message(msg) => msg.created_at,
            Entry::NodeStatus(status) => status.created_at,
            Entry::UserStatus(status) => status.created_at,
        }
    }

    /// The message inside, if this entry is one.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Entry::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<Message> for Entry {
    fn from(msg: Message) -> Self {
        Entry::Message(msg)
    }
}

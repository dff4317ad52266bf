use crate::conversation::Conversation;
use crate::entry::Entry;
use crate::error::FeedError;
use serde::{Deserialize, Serialize};

/// Entries kept in the live feed and in a history window when the server
/// does not say otherwise.
pub const DEFAULT_CAPACITY: usize = 50;

/// Per-conversation bounds.
///
/// Usually supplied by the server alongside the latest messages, so it
/// deserializes from a partial JSON object:
///
/// ```
/// use feedfold::FeedConfig;
///
/// let config: FeedConfig = serde_json::from_str(r#"{"capacity": 100}"#).unwrap();
/// assert_eq!(config.capacity, 100);
/// assert_eq!(config.threshold(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Upper bound on live feed and history window length.
    pub capacity: usize,

    /// Index into the live feed from which a majority overlap is counted.
    /// Defaults to half the capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_threshold: Option<usize>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            capacity: DEFAULT_CAPACITY,
            overlap_threshold: None,
        }
    }
}

impl FeedConfig {
    /// Default config with a different capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        FeedConfig {
            capacity,
            overlap_threshold: None,
        }
    }

    /// The effective overlap threshold: the configured one, or half the
    /// capacity.
    pub fn threshold(&self) -> usize {
        self.overlap_threshold.unwrap_or(self.capacity / 2)
    }

    /// Check the bounds before a conversation is built from them.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidConfig`] if `capacity` is 0 or the
    /// threshold is not below `capacity`.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.capacity == 0 {
            return Err(FeedError::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.threshold() >= self.capacity {
            return Err(FeedError::InvalidConfig(format!(
                "overlap threshold {} must be below capacity {}",
                self.threshold(),
                self.capacity
            )));
        }
        Ok(())
    }
}

/// Builder for a [`Conversation`].
///
/// ```
/// use feedfold::{Conversation, Entry};
/// use serde_json::json;
///
/// let conv = Conversation::builder("pool-1")
///     .capacity(20)
///     .entries(vec![Entry::message("m1", "alice", json!("hello"))])
///     .build()
///     .unwrap();
/// assert_eq!(conv.live().len(), 1);
/// assert_eq!(conv.config().threshold(), 10);
/// ```
#[derive(Debug)]
pub struct ConversationBuilder {
    pool_id: String,
    config: FeedConfig,
    entries: Vec<Entry>,
}

impl ConversationBuilder {
    pub(crate) fn new(pool_id: impl Into<String>) -> Self {
        ConversationBuilder {
            pool_id: pool_id.into(),
            config: FeedConfig::default(),
            entries: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: FeedConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound on live feed and history window length.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Live feed index from which a majority overlap counts.
    pub fn overlap_threshold(mut self, threshold: usize) -> Self {
        self.config.overlap_threshold = Some(threshold);
        self
    }

    /// Initial live feed contents, oldest first.
    pub fn entries(mut self, entries: impl IntoIterator<Item = Entry>) -> Self {
        self.entries = entries.into_iter().collect();
        self
    }

    /// Validate the configuration and create the conversation.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidConfig`] if the configuration fails
    /// [`FeedConfig::validate`].
    pub fn build(self) -> Result<Conversation, FeedError> {
        self.config.validate()?;
        let mut conv = Conversation::with_config(self.pool_id, self.config);
        if !self.entries.is_empty() {
            conv.reset(self.entries);
        }
        Ok(conv)
    }
}

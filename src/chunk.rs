//! History chunks and the storage collaborator that serves them.

use crate::entry::Entry;
use serde::{Deserialize, Serialize};

/// Error produced by a [`ChunkSource`]. The engine never inspects it; it is
/// handed back to the caller inside [`FeedError::FetchFailed`](crate::FeedError::FetchFailed).
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// One page of history returned by a single fetch.
///
/// `chunk_number` is the storage cursor. Chunk 0 holds the oldest entries of
/// the conversation and each newer chunk has the next number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct Chunk {
    pub entries: Vec<Entry>,
    pub chunk_number: u64,

    /// No older chunk exists in storage.
    #[serde(default)]
    pub is_oldest: bool,

    /// This chunk's newest entry borders the live stream.
    #[serde(default, alias = "is_latest")]
    pub is_newest: bool,
}

impl Chunk {
    pub fn new(chunk_number: u64, entries: Vec<Entry>) -> Self {
        Chunk {
            entries,
            chunk_number,
            is_oldest: chunk_number == 0,
            is_newest: false,
        }
    }

    /// Mark this chunk as bordering the live stream.
    pub fn newest(mut self) -> Self {
        self.is_newest = true;
        self
    }

    /// Mark this chunk as the beginning of the conversation.
    pub fn oldest(mut self) -> Self {
        self.is_oldest = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which way a pagination request moves through history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Older,
    Newer,
}

impl Direction {
    /// The ascending flag used by storage APIs (`true` for newer).
    pub fn is_ascending(self) -> bool {
        matches!(self, Direction::Newer)
    }
}

/// Where a fetch should start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkAnchor {
    /// The chunk holding this message id. Used only for the first backward
    /// fetch, when no chunk cursor is known yet.
    MessageId(String),
    /// An exact chunk cursor.
    Number(u64),
}

/// A fetch the caller must resolve against storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRequest {
    pub anchor: ChunkAnchor,
    pub direction: Direction,
}

impl ChunkRequest {
    /// The exact cursor this request expects back, if it is number-anchored.
    pub fn expected_chunk_number(&self) -> Option<u64> {
        match self.anchor {
            ChunkAnchor::Number(n) => Some(n),
            ChunkAnchor::MessageId(_) => None,
        }
    }
}

/// The storage/transport collaborator that resolves chunk requests.
///
/// Implementations may block; the engine only calls this from the
/// synchronous `request_older` / `request_newer` helpers on
/// [`Conversation`](crate::Conversation). Async callers use the two-phase
/// `begin_*` / `complete` API instead and never need this trait.
pub trait ChunkSource {
    fn fetch_chunk(&mut self, pool_id: &str, request: &ChunkRequest) -> Result<Chunk, FetchError>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn fetch_chunk(&mut self, pool_id: &str, request: &ChunkRequest) -> Result<Chunk, FetchError> {
        (**self).fetch_chunk(pool_id, request)
    }
}

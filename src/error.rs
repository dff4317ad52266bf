use crate::chunk::FetchError;
use thiserror::Error;

/// Errors surfaced by feed and pagination operations.
///
/// None of these leave a conversation half-updated: every operation either
/// applies completely or leaves the state as it was, except for the
/// window-fatal kinds (see [`FeedError::is_window_fatal`]), after which the
/// history window has been discarded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedError {
    /// Backward pagination was requested but the live feed holds no message
    /// to page from.
    #[error("no message in the live feed to anchor history from")]
    NoAnchorAvailable,

    /// The beginning of the conversation is already loaded.
    #[error("no older history available")]
    NoMoreHistory,

    /// The storage collaborator failed. State is unchanged; retrying is safe.
    #[error("chunk fetch failed")]
    FetchFailed(#[source] FetchError),

    /// Forward pagination needs an active history window.
    #[error("no history window is active")]
    NoHistoryWindow,

    /// The window already reaches the present and does not yet overlap the
    /// live feed enough to collapse into it.
    #[error("history window already reaches the present")]
    AlreadyAtPresent,

    /// Another pagination request for this conversation has not completed.
    #[error("a pagination request is already in flight")]
    RequestInFlight,

    /// A chunk was delivered but nothing is waiting for one.
    #[error("no pagination request is pending")]
    NoPendingRequest,

    /// A delivered chunk does not carry the requested cursor.
    #[error("expected chunk {expected}, got chunk {actual}")]
    ChunkMismatch { expected: u64, actual: u64 },

    /// A delivered chunk holds no entries.
    #[error("chunk {chunk_number} is empty")]
    EmptyChunk { chunk_number: u64 },

    #[error("invalid feed configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown pool: {0}")]
    UnknownPool(String),
}

impl FeedError {
    /// Data-consistency anomalies. When one of these is returned the history
    /// window has already been dropped and the conversation is back in live
    /// mode.
    pub fn is_window_fatal(&self) -> bool {
        matches!(
            self,
            FeedError::ChunkMismatch { .. } | FeedError::EmptyChunk { .. }
        )
    }
}

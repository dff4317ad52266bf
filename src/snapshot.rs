//! Render snapshots handed to the presentation layer.

use crate::entry::Entry;
use serde::{Deserialize, Serialize};

/// Which sequence a snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    Live,
    History,
}

/// A point-in-time copy of what a conversation should display.
///
/// Cheap to ship across a process boundary as JSON:
///
/// ```text
/// {
///   "pool_id": "pool-1",
///   "mode": "history",
///   "entries": [{ "kind": "message", "id": "m7", ... }, ...],
///   "has_more_older": true,
///   "has_more_newer": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct FeedSnapshot {
    pub pool_id: String,

    pub mode: FeedMode,

    /// The current view, oldest first.
    pub entries: Vec<Entry>,

    /// A "load older" affordance should be shown.
    pub has_more_older: bool,

    /// A "load newer" affordance should be shown. Always false in live mode.
    pub has_more_newer: bool,
}

impl FeedSnapshot {
    pub fn new(
        pool_id: String,
        mode: FeedMode,
        entries: Vec<Entry>,
        has_more_older: bool,
        has_more_newer: bool,
    ) -> Self {
        FeedSnapshot {
            pool_id,
            mode,
            entries,
            has_more_older,
            has_more_newer,
        }
    }

    /// Id of the newest message shown, for "scroll to" bookkeeping.
    pub fn newest_message_id(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|e| e.id())
    }
}

use crate::entry::Entry;
use std::collections::VecDeque;

/// The bounded tail of a conversation, fed by live delivery.
///
/// Holds at most `capacity` entries. Eviction keeps the feed anchored: once
/// the head is a message, eviction never promotes a status entry to the head.
///
/// ```
/// use feedfold::{Entry, LiveFeed};
/// use serde_json::json;
///
/// let mut feed = LiveFeed::new(3);
/// feed.append(Entry::message("m1", "alice", json!("a")));
/// feed.append(Entry::user_joined("bob"));
/// feed.append(Entry::message("m2", "alice", json!("b")));
/// feed.append(Entry::message("m3", "bob", json!("c")));
///
/// // Dropping m1 would leave the join event at the head, so the join event
/// // is evicted instead.
/// let ids: Vec<_> = feed.iter().map(|e| e.id()).collect();
/// assert_eq!(ids, vec![Some("m1"), Some("m2"), Some("m3")]);
/// ```
#[derive(Debug, Clone)]
pub struct LiveFeed {
    entries: VecDeque<Entry>,
    capacity: usize,
}

impl LiveFeed {
    /// Create an empty feed bounded at `capacity` entries.
    ///
    /// Nothing is reserved up front; storage grows with the feed.
    pub fn new(capacity: usize) -> Self {
        LiveFeed {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Append one delivered entry, evicting if the feed overflows.
    pub fn append(&mut self, entry: Entry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.evict_one();
        }
    }

    /// Replace the whole feed, e.g. on (re)connect or initial load.
    ///
    /// If `entries` exceeds capacity the oldest ones are dropped first, using
    /// the same eviction rule as [`append`](Self::append).
    pub fn reset(&mut self, entries: impl IntoIterator<Item = Entry>) {
        self.entries.clear();
        for entry in entries {
            self.append(entry);
        }
    }

    /// Drop every entry. The capacity is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove the oldest entry whose removal does not leave a status entry at
    /// the head of an anchored feed.
    ///
    /// The head is removable when it is not itself an anchor, or when the
    /// entry behind it is. Otherwise the head stays and the next entry goes.
    fn evict_one(&mut self) {
        let victim = (0..self.entries.len())
            .find(|&i| self.is_removable(i))
            .unwrap_or(0);
        if let Some(evicted) = self.entries.remove(victim) {
            log::trace!("live feed evicted entry at {victim} (anchor: {})", evicted.is_anchor());
        }
    }

    fn is_removable(&self, index: usize) -> bool {
        if index > 0 {
            return true;
        }
        match (self.entries.front(), self.entries.get(1)) {
            (Some(head), Some(next)) => !head.is_anchor() || next.is_anchor(),
            _ => true,
        }
    }

    /// The feed, oldest first.
    pub fn entries(&self) -> &VecDeque<Entry> {
        &self.entries
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the feed holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The bound this feed evicts at.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The first message in the feed: the anchor shared with history.
    pub fn first_anchor(&self) -> Option<(usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .find_map(|(i, entry)| entry.id().map(|id| (i, id)))
    }

    /// Index of the entry carrying `id`.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == Some(id))
    }
}

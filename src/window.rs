use crate::chunk::Chunk;
use crate::entry::Entry;
use serde::Serialize;
use std::collections::VecDeque;

/// The fewest chunks a trim may leave behind, so one full chunk boundary
/// stays addressable on each side.
pub const MIN_RETAINED_CHUNKS: usize = 2;

/// A contiguous range of history assembled from consecutive chunks.
///
/// `chunk_lens` lists the length of every loaded chunk, oldest first, and
/// always sums to `entries.len()`. The chunk at `chunk_lens[i]` has cursor
/// `oldest_chunk_number + i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryWindow {
    entries: VecDeque<Entry>,
    chunk_lens: VecDeque<usize>,
    oldest_chunk_number: u64,
    reaches_present: bool,
    reaches_beginning: bool,
}

impl HistoryWindow {
    /// Start a window from the first fetched chunk.
    pub fn seed(chunk: Chunk) -> Self {
        let len = chunk.entries.len();
        HistoryWindow {
            entries: chunk.entries.into(),
            chunk_lens: VecDeque::from([len]),
            oldest_chunk_number: chunk.chunk_number,
            reaches_present: chunk.is_newest,
            reaches_beginning: chunk.is_oldest || chunk.chunk_number == 0,
        }
    }

    /// Cursor of the chunk just older than the oldest loaded one, or `None`
    /// at the beginning of the conversation.
    pub fn older_cursor(&self) -> Option<u64> {
        if self.reaches_beginning || self.oldest_chunk_number == 0 {
            None
        } else {
            Some(self.oldest_chunk_number - 1)
        }
    }

    /// Cursor of the chunk just past the newest loaded one.
    pub fn newer_cursor(&self) -> u64 {
        self.oldest_chunk_number + self.chunk_lens.len() as u64
    }

    /// Put an older chunk in front, then trim from the newest end.
    ///
    /// The caller has checked that `chunk` is the one at
    /// [`older_cursor`](Self::older_cursor).
    pub fn prepend_older(&mut self, chunk: Chunk, capacity: usize) {
        let len = chunk.entries.len();
        let mut merged: VecDeque<Entry> = chunk.entries.into();
        merged.append(&mut self.entries);
        self.entries = merged;
        self.chunk_lens.push_front(len);
        self.oldest_chunk_number = chunk.chunk_number;
        self.reaches_beginning = chunk.is_oldest || chunk.chunk_number == 0;

        let dropped = self.trim_newest(capacity);
        if dropped > 0 {
            self.reaches_present = false;
        }
        log::debug!(
            "prepended chunk {} ({len} entries), trimmed {dropped} newer chunks",
            self.oldest_chunk_number
        );
    }

    /// Put a newer chunk at the back, then trim from the oldest end.
    ///
    /// The caller has checked that `chunk` is the one at
    /// [`newer_cursor`](Self::newer_cursor).
    pub fn append_newer(&mut self, chunk: Chunk, capacity: usize) {
        let len = chunk.entries.len();
        let number = chunk.chunk_number;
        self.entries.extend(chunk.entries);
        self.chunk_lens.push_back(len);
        self.reaches_present = chunk.is_newest;

        let dropped = self.trim_oldest(capacity);
        log::debug!("appended chunk {number} ({len} entries), trimmed {dropped} older chunks");
    }

    /// Drop whole chunks off the newest end while over `capacity`, keeping at
    /// least [`MIN_RETAINED_CHUNKS`]. Returns how many chunks were dropped.
    pub fn trim_newest(&mut self, capacity: usize) -> usize {
        let mut dropped = 0;
        while self.entries.len() > capacity && self.chunk_lens.len() > MIN_RETAINED_CHUNKS {
            let Some(len) = self.chunk_lens.pop_back() else {
                break;
            };
            let keep = self.entries.len() - len;
            self.entries.truncate(keep);
            dropped += 1;
        }
        dropped
    }

    /// Drop whole chunks off the oldest end while over `capacity`, keeping at
    /// least [`MIN_RETAINED_CHUNKS`]. Returns how many chunks were dropped.
    pub fn trim_oldest(&mut self, capacity: usize) -> usize {
        let mut dropped = 0;
        while self.entries.len() > capacity && self.chunk_lens.len() > MIN_RETAINED_CHUNKS {
            let Some(len) = self.chunk_lens.pop_front() else {
                break;
            };
            self.entries.drain(..len);
            self.oldest_chunk_number += 1;
            self.reaches_beginning = false;
            dropped += 1;
        }
        dropped
    }

    /// Replace everything from `from` (an index into the last chunk) to the
    /// end with `tail`, keeping the last chunk's length in step.
    pub(crate) fn splice_tail(&mut self, from: usize, tail: impl IntoIterator<Item = Entry>) {
        let removed = self.entries.len() - from;
        self.entries.truncate(from);
        let before = self.entries.len();
        self.entries.extend(tail);
        let added = self.entries.len() - before;
        if let Some(last) = self.chunk_lens.back_mut() {
            *last = *last + added - removed;
        }
    }

    /// Index in `entries` where the newest chunk starts.
    pub fn last_chunk_start(&self) -> usize {
        self.entries.len() - self.last_chunk_len()
    }

    pub fn last_chunk_len(&self) -> usize {
        self.chunk_lens.back().copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &VecDeque<Entry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chunk_lens(&self) -> &VecDeque<usize> {
        &self.chunk_lens
    }

    pub fn oldest_chunk_number(&self) -> u64 {
        self.oldest_chunk_number
    }

    /// The newest loaded chunk borders the live stream.
    pub fn reaches_present(&self) -> bool {
        self.reaches_present
    }

    /// The oldest loaded chunk is the start of the conversation.
    pub fn reaches_beginning(&self) -> bool {
        self.older_cursor().is_none()
    }

    /// `chunk_lens` accounts for every entry.
    pub fn is_consistent(&self) -> bool {
        !self.chunk_lens.is_empty() && self.chunk_lens.iter().sum::<usize>() == self.entries.len()
    }
}

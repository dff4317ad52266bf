#![allow(dead_code)]

use feedfold::{Chunk, ChunkAnchor, ChunkRequest, ChunkSource, Entry, FetchError, Message};
use serde_json::json;
use std::collections::VecDeque;

pub fn msg(id: &str) -> Entry {
    Message::new(id, "alice", json!({"text": id})).at(1000).into()
}

pub fn msgs(prefix: &str, range: std::ops::RangeInclusive<usize>) -> Vec<Entry> {
    range.map(|i| msg(&format!("{prefix}{i}"))).collect()
}

pub fn joined(user: &str) -> Entry {
    Entry::user_joined(user)
}

/// Message ids in order, with `-` standing in for status entries.
pub fn ids<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.id().unwrap_or("-").to_string())
        .collect()
}

pub fn ids_of(entries: &VecDeque<Entry>) -> Vec<String> {
    ids(entries.iter())
}

/// Stored history split into fixed-size chunks, chunk 0 oldest.
pub struct MemoryStore {
    pub messages: Vec<Entry>,
    pub chunk_size: usize,
    pub fetches: Vec<ChunkRequest>,
    pub fail_next: bool,
}

impl MemoryStore {
    /// `count` messages named `m1..=m{count}`.
    pub fn new(count: usize, chunk_size: usize) -> Self {
        MemoryStore {
            messages: msgs("m", 1..=count),
            chunk_size,
            fetches: Vec::new(),
            fail_next: false,
        }
    }

    pub fn last_chunk(&self) -> u64 {
        ((self.messages.len().max(1) - 1) / self.chunk_size) as u64
    }

    /// The newest `n` stored messages, as a live feed would hold them.
    pub fn tail(&self, n: usize) -> Vec<Entry> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].to_vec()
    }

    pub fn chunk(&self, n: u64) -> Option<Chunk> {
        if n > self.last_chunk() {
            return None;
        }
        let start = n as usize * self.chunk_size;
        let end = (start + self.chunk_size).min(self.messages.len());
        let mut chunk = Chunk::new(n, self.messages[start..end].to_vec());
        if n == self.last_chunk() {
            chunk = chunk.newest();
        }
        Some(chunk)
    }
}

impl ChunkSource for MemoryStore {
    fn fetch_chunk(&mut self, _pool_id: &str, request: &ChunkRequest) -> Result<Chunk, FetchError> {
        self.fetches.push(request.clone());
        if self.fail_next {
            self.fail_next = false;
            return Err("storage unavailable".into());
        }
        let n = match &request.anchor {
            ChunkAnchor::Number(n) => *n,
            ChunkAnchor::MessageId(id) => {
                let idx = self
                    .messages
                    .iter()
                    .position(|e| e.id() == Some(id.as_str()))
                    .ok_or_else(|| format!("unknown message {id}"))?;
                (idx / self.chunk_size) as u64
            }
        };
        self.chunk(n).ok_or_else(|| format!("no chunk {n}").into())
    }
}

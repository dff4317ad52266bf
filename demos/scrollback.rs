//! Scroll back through a conversation and return to the present.
//!
//! A fake storage tier holds 120 messages in chunks of 10. The conversation
//! keeps a live feed of 30, pages back to the very beginning, then pages
//! forward until the history window overlaps the live feed and collapses.

use feedfold::{Chunk, ChunkAnchor, ChunkRequest, ChunkSource, Conversation, Entry, FetchError};
use serde_json::json;

struct Storage {
    messages: Vec<Entry>,
    chunk_size: usize,
}

impl Storage {
    fn last_chunk(&self) -> u64 {
        ((self.messages.len() - 1) / self.chunk_size) as u64
    }
}

impl ChunkSource for Storage {
    fn fetch_chunk(&mut self, pool_id: &str, request: &ChunkRequest) -> Result<Chunk, FetchError> {
        let n = match &request.anchor {
            ChunkAnchor::Number(n) => *n,
            ChunkAnchor::MessageId(id) => {
                let idx = self
                    .messages
                    .iter()
                    .position(|e| e.id() == Some(id.as_str()))
                    .ok_or_else(|| format!("{pool_id}: unknown message {id}"))?;
                (idx / self.chunk_size) as u64
            }
        };
        if n > self.last_chunk() {
            return Err(format!("{pool_id}: no chunk {n}").into());
        }
        let start = n as usize * self.chunk_size;
        let end = (start + self.chunk_size).min(self.messages.len());
        let chunk = Chunk::new(n, self.messages[start..end].to_vec());
        Ok(if n == self.last_chunk() { chunk.newest() } else { chunk })
    }
}

fn describe(conv: &Conversation) -> String {
    let view = conv.current_view();
    let first = view.front().and_then(|e| e.id()).unwrap_or("-");
    let last = view.back().and_then(|e| e.id()).unwrap_or("-");
    match conv.window() {
        Some(w) => format!(
            "history {first}..{last} ({} entries, chunks {:?} from #{})",
            view.len(),
            w.chunk_lens(),
            w.oldest_chunk_number()
        ),
        None => format!("live {first}..{last} ({} entries)", view.len()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let messages: Vec<Entry> = (1..=120)
        .map(|i| Entry::message(format!("m{i}"), "alice", json!({"text": format!("hello {i}")})))
        .collect();
    let mut storage = Storage {
        messages: messages.clone(),
        chunk_size: 10,
    };

    let mut conv = Conversation::builder("general")
        .capacity(30)
        .entries(messages[90..].to_vec())
        .build()?;
    conv.user_joined("bob");
    println!("start:   {}", describe(&conv));

    while conv.request_older(&mut storage)? {
        println!("older:   {}", describe(&conv));
    }
    println!("oldest:  {}", describe(&conv));

    while conv.request_newer(&mut storage)? {
        println!("newer:   {}", describe(&conv));
    }
    println!("present: {}", describe(&conv));

    if conv.should_collapse() {
        conv.collapse_to_live();
    }
    println!("back:    {}", describe(&conv));

    Ok(())
}

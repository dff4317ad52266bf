//! Aligning a history window with the live feed.
//!
//! Both functions are pure over their inputs apart from the window mutation
//! in [`stitch`]; neither touches the live feed.

use crate::live::LiveFeed;
use crate::window::HistoryWindow;

/// What [`stitch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchOutcome {
    /// The window's newest message is not in the live feed yet.
    NoOverlap,
    /// The live feed's anchor is not inside the window's newest chunk.
    AnchorOutsideLastChunk,
    /// The window tail was replaced by the live feed's leading run.
    Stitched {
        /// Entries removed from the window tail.
        replaced: usize,
        /// Entries copied in from the live feed.
        inserted: usize,
    },
}

/// Splice the window's newest chunk onto the head of the live feed.
///
/// Both sides hold the boundary region independently. When the window's
/// newest message appears in the live feed at index `i`, and the live feed's
/// first message (its anchor) appears in the window's newest chunk, the
/// window tail from that anchor onward is replaced by `live[anchor..=i]`.
/// Afterwards the window ends with exactly the live feed's leading run, so
/// re-running is a no-op on the entries.
///
/// If splicing pushes the window over `capacity`, whole chunks are trimmed
/// from the oldest end as after any forward merge.
pub fn stitch(window: &mut HistoryWindow, live: &LiveFeed, capacity: usize) -> StitchOutcome {
    let Some(last_id) = newest_message_id(window) else {
        return StitchOutcome::NoOverlap;
    };
    let Some((anchor_idx, anchor_id)) = live.first_anchor() else {
        return StitchOutcome::NoOverlap;
    };
    let Some(overlap_end) = live.position_of(last_id) else {
        return StitchOutcome::NoOverlap;
    };
    if overlap_end < anchor_idx {
        return StitchOutcome::NoOverlap;
    }

    let chunk_start = window.last_chunk_start();
    let Some(splice_at) = window
        .entries()
        .iter()
        .skip(chunk_start)
        .rposition(|e| e.id() == Some(anchor_id))
        .map(|offset| chunk_start + offset)
    else {
        return StitchOutcome::AnchorOutsideLastChunk;
    };

    let replaced = window.len() - splice_at;
    let inserted = overlap_end + 1 - anchor_idx;
    let tail: Vec<_> = live
        .iter()
        .skip(anchor_idx)
        .take(inserted)
        .cloned()
        .collect();
    window.splice_tail(splice_at, tail);
    let trimmed = window.trim_oldest(capacity);

    log::debug!(
        "stitched window to live feed: replaced {replaced}, inserted {inserted}, trimmed {trimmed} chunks"
    );
    StitchOutcome::Stitched { replaced, inserted }
}

/// Whether the window's newest message appears in the newer part of the live
/// feed, at or after index `threshold`.
///
/// A match only in the older part does not count: the live feed must cover
/// the window's present edge with room to spare before paging forward is
/// pointless and the window should collapse.
pub fn majority_overlap(window: &HistoryWindow, live: &LiveFeed, threshold: usize) -> bool {
    let Some(last_id) = newest_message_id(window) else {
        return false;
    };
    live.iter().skip(threshold).any(|e| e.id() == Some(last_id))
}

fn newest_message_id(window: &HistoryWindow) -> Option<&str> {
    window.entries().iter().rev().find_map(|e| e.id())
}

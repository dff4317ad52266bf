mod chunk;
mod config;
mod conversation;
mod entry;
mod error;
mod live;
pub mod reconcile;
mod registry;
pub mod snapshot;
mod window;

pub use chunk::{Chunk, ChunkAnchor, ChunkRequest, ChunkSource, Direction, FetchError};
pub use config::{ConversationBuilder, FeedConfig, DEFAULT_CAPACITY};
pub use conversation::{Conversation, HistoryState, NewerStep};
pub use entry::{Entry, Message, NodeStatus, UserStatus};
pub use error::FeedError;
pub use live::LiveFeed;
pub use reconcile::StitchOutcome;
pub use registry::FeedRegistry;
pub use snapshot::{FeedMode, FeedSnapshot};
pub use window::{HistoryWindow, MIN_RETAINED_CHUNKS};

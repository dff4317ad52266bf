use crate::chunk::{Chunk, ChunkAnchor, ChunkRequest, ChunkSource, Direction, FetchError};
use crate::config::{ConversationBuilder, FeedConfig};
use crate::entry::Entry;
use crate::error::FeedError;
use crate::live::LiveFeed;
use crate::reconcile::{self, StitchOutcome};
use crate::snapshot::{FeedMode, FeedSnapshot};
use crate::window::HistoryWindow;
use std::collections::{HashMap, VecDeque};

/// Whether the conversation is showing paginated history.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HistoryState {
    /// Live mode: the live feed is what gets rendered.
    #[default]
    Absent,
    /// The user has scrolled past the live feed into loaded history.
    Active(HistoryWindow),
}

impl HistoryState {
    pub fn is_active(&self) -> bool {
        matches!(self, HistoryState::Active(_))
    }

    pub fn window(&self) -> Option<&HistoryWindow> {
        match self {
            HistoryState::Active(window) => Some(window),
            HistoryState::Absent => None,
        }
    }
}

/// Result of [`Conversation::begin_newer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewerStep {
    /// Resolve this request and pass the chunk to [`Conversation::complete`].
    Fetch(ChunkRequest),
    /// The window already overlapped the live feed and has been dropped.
    /// Nothing to fetch.
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    direction: Direction,
    expected: Option<u64>,
}

/// Feed state for one conversation ("pool"): the live feed, an optional
/// history window, and at most one pagination request in flight.
///
/// All mutation goes through `&mut self`, so live delivery and chunk merges
/// for a conversation are serialized by construction.
///
/// Pagination is two-phase. `begin_older` / `begin_newer` hand back a
/// [`ChunkRequest`] for the caller to resolve however it likes; the fetched
/// chunk is merged with [`complete`](Self::complete). Nothing changes until
/// a whole chunk is delivered. Callers with a blocking [`ChunkSource`] can
/// use [`request_older`](Self::request_older) and
/// [`request_newer`](Self::request_newer) instead.
#[derive(Debug, Clone)]
pub struct Conversation {
    pool_id: String,
    config: FeedConfig,
    live: LiveFeed,
    history: HistoryState,
    pending: Option<Pending>,
    active_nodes: HashMap<String, String>,
}

impl Conversation {
    pub fn builder(pool_id: impl Into<String>) -> ConversationBuilder {
        ConversationBuilder::new(pool_id)
    }

    /// Create an empty conversation. `config` must already be valid.
    pub(crate) fn with_config(pool_id: String, config: FeedConfig) -> Self {
        Conversation {
            pool_id,
            live: LiveFeed::new(config.capacity),
            config,
            history: HistoryState::Absent,
            pending: None,
            active_nodes: HashMap::new(),
        }
    }

    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn live(&self) -> &LiveFeed {
        &self.live
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn window(&self) -> Option<&HistoryWindow> {
        self.history.window()
    }

    /// A pagination request has been issued and not yet completed.
    pub fn is_paging(&self) -> bool {
        self.pending.is_some()
    }

    /// What the presentation layer should render right now.
    pub fn current_view(&self) -> &VecDeque<Entry> {
        match &self.history {
            HistoryState::Active(window) => window.entries(),
            HistoryState::Absent => self.live.entries(),
        }
    }

    // --- live delivery ---

    /// Append one delivered entry to the live feed.
    pub fn append(&mut self, entry: Entry) {
        self.live.append(entry);
    }

    /// Replace the live feed wholesale (connect or initial load). Any history
    /// window and pending request are dropped.
    pub fn reset(&mut self, entries: impl IntoIterator<Item = Entry>) {
        self.live.reset(entries);
        self.drop_history("live feed reset");
    }

    /// Forget everything, as on disconnect.
    pub fn clear(&mut self) {
        self.live.clear();
        self.active_nodes.clear();
        self.drop_history("conversation cleared");
    }

    pub fn user_joined(&mut self, user_id: &str) {
        self.append(Entry::user_joined(user_id));
    }

    pub fn user_left(&mut self, user_id: &str) {
        self.append(Entry::user_left(user_id));
    }

    /// Record a device coming online and show it in the feed.
    pub fn node_joined(&mut self, node_id: &str, user_id: &str) {
        self.active_nodes
            .insert(node_id.to_string(), user_id.to_string());
        self.append(Entry::node_active(node_id, user_id));
    }

    /// Record a device going offline. Unknown devices are ignored and
    /// produce no feed entry.
    pub fn node_left(&mut self, node_id: &str) -> bool {
        match self.active_nodes.remove(node_id) {
            Some(user_id) => {
                self.append(Entry::node_inactive(node_id, user_id));
                true
            }
            None => false,
        }
    }

    /// Replace the set of known devices without touching the feed, as when
    /// the server reports who is already online on connect.
    pub fn set_active_nodes<I, N, U>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        self.active_nodes = nodes
            .into_iter()
            .map(|(node, user)| (node.into(), user.into()))
            .collect();
    }

    /// User owning an online device.
    pub fn active_node_user(&self, node_id: &str) -> Option<&str> {
        self.active_nodes.get(node_id).map(String::as_str)
    }

    // --- pagination ---

    /// Start a backward page.
    ///
    /// In live mode the request is anchored on the live feed's oldest
    /// message. With a window active it asks for the chunk just older than
    /// the oldest loaded.
    ///
    /// # Errors
    ///
    /// [`FeedError::RequestInFlight`] if a page is already pending,
    /// [`FeedError::NoAnchorAvailable`] in live mode with no message to
    /// anchor on, [`FeedError::NoMoreHistory`] when the beginning of the
    /// conversation is loaded.
    pub fn begin_older(&mut self) -> Result<ChunkRequest, FeedError> {
        self.ensure_idle()?;
        let (anchor, expected) = match &self.history {
            HistoryState::Absent => {
                let (_, id) = self.live.first_anchor().ok_or(FeedError::NoAnchorAvailable)?;
                (ChunkAnchor::MessageId(id.to_string()), None)
            }
            HistoryState::Active(window) => {
                let n = window.older_cursor().ok_or(FeedError::NoMoreHistory)?;
                (ChunkAnchor::Number(n), Some(n))
            }
        };
        self.pending = Some(Pending {
            direction: Direction::Older,
            expected,
        });
        Ok(ChunkRequest {
            anchor,
            direction: Direction::Older,
        })
    }

    /// Start a forward page.
    ///
    /// When the window already reaches the present there is nothing newer to
    /// fetch: if it overlaps the live feed by a majority the window is
    /// collapsed and [`NewerStep::Collapsed`] returned.
    ///
    /// # Errors
    ///
    /// [`FeedError::RequestInFlight`] if a page is already pending,
    /// [`FeedError::NoHistoryWindow`] in live mode,
    /// [`FeedError::AlreadyAtPresent`] when the window reaches the present
    /// but does not overlap enough to collapse.
    pub fn begin_newer(&mut self) -> Result<NewerStep, FeedError> {
        self.ensure_idle()?;
        let window = self.history.window().ok_or(FeedError::NoHistoryWindow)?;
        if window.reaches_present() {
            if self.should_collapse() {
                self.collapse_to_live();
                return Ok(NewerStep::Collapsed);
            }
            return Err(FeedError::AlreadyAtPresent);
        }
        let n = window.newer_cursor();
        self.pending = Some(Pending {
            direction: Direction::Newer,
            expected: Some(n),
        });
        Ok(NewerStep::Fetch(ChunkRequest {
            anchor: ChunkAnchor::Number(n),
            direction: Direction::Newer,
        }))
    }

    /// Merge the outcome of the pending fetch.
    ///
    /// Returns whether more history remains in the direction of the request.
    /// A fetch error is passed through as [`FeedError::FetchFailed`] with
    /// state untouched, so the request can be issued again.
    ///
    /// # Errors
    ///
    /// [`FeedError::NoPendingRequest`] if nothing is waiting (for example the
    /// request was abandoned or the feed was reset meanwhile). A chunk with
    /// the wrong cursor, or an empty one, discards the window and returns the
    /// matching window-fatal error.
    pub fn complete(&mut self, result: Result<Chunk, FetchError>) -> Result<bool, FeedError> {
        let pending = self.pending.take().ok_or(FeedError::NoPendingRequest)?;
        let chunk = result.map_err(FeedError::FetchFailed)?;
        self.check_chunk(&chunk, pending.expected)?;

        let capacity = self.config.capacity;
        if let HistoryState::Active(window) = &mut self.history {
            let more = match pending.direction {
                Direction::Older => {
                    window.prepend_older(chunk, capacity);
                    window.older_cursor().is_some()
                }
                Direction::Newer => {
                    window.append_newer(chunk, capacity);
                    if window.reaches_present() {
                        reconcile::stitch(window, &self.live, capacity);
                    }
                    !window.reaches_present()
                }
            };
            return Ok(more);
        }

        if pending.direction == Direction::Newer {
            return Err(FeedError::NoHistoryWindow);
        }
        let mut window = HistoryWindow::seed(chunk);
        log::debug!(
            "pool {}: history window opened at chunk {} ({} entries)",
            self.pool_id,
            window.oldest_chunk_number(),
            window.len()
        );
        if window.reaches_present() {
            reconcile::stitch(&mut window, &self.live, capacity);
        }
        let more = window.older_cursor().is_some();
        self.history = HistoryState::Active(window);
        Ok(more)
    }

    /// Give up on the pending fetch. A chunk arriving later is rejected.
    pub fn abandon(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!(
                "pool {}: abandoned {:?} page request",
                self.pool_id,
                pending.direction
            );
        }
    }

    /// Drop the history window and return to live mode.
    ///
    /// Returns whether older history can be requested from the live feed.
    pub fn collapse_to_live(&mut self) -> bool {
        self.drop_history("collapsed to live");
        self.live.first_anchor().is_some()
    }

    /// The window's present edge sits in the newer half of the live feed;
    /// paging forward would only re-derive what the live feed already holds.
    pub fn should_collapse(&self) -> bool {
        match &self.history {
            HistoryState::Active(window) => {
                reconcile::majority_overlap(window, &self.live, self.config.threshold())
            }
            HistoryState::Absent => false,
        }
    }

    /// Re-run the overlap stitch against the current live feed. `None` in
    /// live mode.
    pub fn stitch(&mut self) -> Option<StitchOutcome> {
        let capacity = self.config.capacity;
        match &mut self.history {
            HistoryState::Active(window) => Some(reconcile::stitch(window, &self.live, capacity)),
            HistoryState::Absent => None,
        }
    }

    /// Fetch and merge one older chunk through `source`.
    pub fn request_older<S: ChunkSource>(&mut self, mut source: S) -> Result<bool, FeedError> {
        let request = self.begin_older()?;
        let result = source.fetch_chunk(&self.pool_id, &request);
        self.complete(result)
    }

    /// Fetch and merge one newer chunk through `source`, or collapse into the
    /// live feed if the window already overlaps it.
    pub fn request_newer<S: ChunkSource>(&mut self, mut source: S) -> Result<bool, FeedError> {
        match self.begin_newer()? {
            NewerStep::Collapsed => Ok(false),
            NewerStep::Fetch(request) => {
                let result = source.fetch_chunk(&self.pool_id, &request);
                self.complete(result)
            }
        }
    }

    pub fn has_more_older(&self) -> bool {
        match &self.history {
            HistoryState::Active(window) => window.older_cursor().is_some(),
            HistoryState::Absent => self.live.first_anchor().is_some(),
        }
    }

    pub fn has_more_newer(&self) -> bool {
        match &self.history {
            HistoryState::Active(window) => !window.reaches_present(),
            HistoryState::Absent => false,
        }
    }

    /// Clone out what the presentation layer needs to render.
    pub fn snapshot(&self) -> FeedSnapshot {
        let mode = if self.history.is_active() {
            FeedMode::History
        } else {
            FeedMode::Live
        };
        FeedSnapshot::new(
            self.pool_id.clone(),
            mode,
            self.current_view().iter().cloned().collect(),
            self.has_more_older(),
            self.has_more_newer(),
        )
    }

    fn ensure_idle(&self) -> Result<(), FeedError> {
        match self.pending {
            Some(_) => Err(FeedError::RequestInFlight),
            None => Ok(()),
        }
    }

    /// Reject chunks that cannot be merged safely. A bad chunk for an active
    /// window takes the window down with it.
    fn check_chunk(&mut self, chunk: &Chunk, expected: Option<u64>) -> Result<(), FeedError> {
        let err = match expected {
            Some(n) if chunk.chunk_number != n => FeedError::ChunkMismatch {
                expected: n,
                actual: chunk.chunk_number,
            },
            _ if chunk.is_empty() => FeedError::EmptyChunk {
                chunk_number: chunk.chunk_number,
            },
            _ => return Ok(()),
        };
        log::warn!("pool {}: {err}; discarding history window", self.pool_id);
        self.drop_history("inconsistent chunk");
        Err(err)
    }

    fn drop_history(&mut self, reason: &str) {
        self.pending = None;
        if self.history.is_active() {
            log::debug!("pool {}: history window dropped ({reason})", self.pool_id);
        }
        self.history = HistoryState::Absent;
    }
}

use crate::config::FeedConfig;
use crate::conversation::Conversation;
use crate::entry::Entry;
use crate::error::FeedError;
use std::collections::HashMap;

/// Owns one [`Conversation`] per pool.
///
/// Every conversation gets its own copy of the registry's config, so pools
/// never share bounds or state.
#[derive(Debug, Default)]
pub struct FeedRegistry {
    config: FeedConfig,
    pools: HashMap<String, Conversation>,
}

impl FeedRegistry {
    /// Create an empty registry whose pools all use `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidConfig`] if `config` fails
    /// [`FeedConfig::validate`].
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        Ok(FeedRegistry {
            config,
            pools: HashMap::new(),
        })
    }

    /// The config every new pool is created with.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Get the conversation for `pool_id`, creating an empty one if needed.
    pub fn open(&mut self, pool_id: &str) -> &mut Conversation {
        let config = self.config;
        self.pools
            .entry(pool_id.to_string())
            .or_insert_with(|| Conversation::with_config(pool_id.to_string(), config))
    }

    /// Load the initial live feed for a pool, replacing whatever it held.
    pub fn load(&mut self, pool_id: &str, entries: impl IntoIterator<Item = Entry>) -> &mut Conversation {
        let conv = self.open(pool_id);
        conv.reset(entries);
        conv
    }

    /// The conversation for `pool_id`, if registered.
    pub fn get(&self, pool_id: &str) -> Option<&Conversation> {
        self.pools.get(pool_id)
    }

    /// Mutable access to a registered conversation.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownPool`] if `pool_id` was never opened or
    /// has been removed.
    pub fn get_mut(&mut self, pool_id: &str) -> Result<&mut Conversation, FeedError> {
        self.pools
            .get_mut(pool_id)
            .ok_or_else(|| FeedError::UnknownPool(pool_id.to_string()))
    }

    /// Empty a pool's feeds on disconnect. The pool stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownPool`] if `pool_id` is not registered.
    pub fn clear(&mut self, pool_id: &str) -> Result<(), FeedError> {
        self.get_mut(pool_id)?.clear();
        Ok(())
    }

    /// Unregister a pool, handing back its conversation.
    pub fn remove(&mut self, pool_id: &str) -> Option<Conversation> {
        self.pools.remove(pool_id)
    }

    /// Ids of all registered pools, in no particular order.
    pub fn pool_ids(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    /// Number of registered pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns `true` if no pool is registered.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

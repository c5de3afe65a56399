// Todo collection manager: owns the items, the active filter and persistence

use crate::codec;
use crate::error::{Result, TodoError};
use crate::filter::Filter;
use crate::medium::Medium;
use crate::models::{TodoItem, now_ms};
use crate::notify::{Level, Notification};
use tracing::{debug, info, warn};

/// Storage key used when none is given
pub const DEFAULT_KEY: &str = "todos";

/// Ordered todo collection (newest first) persisted through a [`Medium`]
///
/// Every mutating operation writes the full collection to the medium before
/// returning. If that write fails the in-memory change is kept and
/// [`TodoError::Persistence`] is returned.
pub struct TodoStore<M: Medium> {
    medium: M,
    key: String,
    items: Vec<TodoItem>,
    filter: Filter,
    notifications: Vec<Notification>,
    clock: fn() -> i64,
}

impl<M: Medium> TodoStore<M> {
    /// Load the collection stored under [`DEFAULT_KEY`]
    pub fn open(medium: M) -> Result<Self> {
        Self::open_with_key(medium, DEFAULT_KEY)
    }

    /// Load the collection stored under `key`
    ///
    /// A missing or unparseable value starts an empty collection. A medium
    /// that cannot be read at all is an error.
    pub fn open_with_key(medium: M, key: &str) -> Result<Self> {
        Self::with_clock(medium, key, now_ms)
    }

    /// Like [`open_with_key`](Self::open_with_key) with a custom millisecond clock for new ids
    pub fn with_clock(medium: M, key: &str, clock: fn() -> i64) -> Result<Self> {
        Self::validate_key(key)?;

        let items = match medium.load(key)? {
            Some(raw) => codec::decode(&raw),
            None => {
                debug!(key, "No stored todos, starting empty");
                Vec::new()
            }
        };

        info!(key, count = items.len(), "Opened todo store");

        Ok(Self {
            medium,
            key: key.to_string(),
            items,
            filter: Filter::All,
            notifications: Vec::new(),
            clock,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Consume the store, handing back its medium
    pub fn into_medium(self) -> M {
        self.medium
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Prepend a new incomplete todo
    pub fn add(&mut self, raw_text: &str) -> Result<TodoItem> {
        let text = raw_text.trim();
        if text.is_empty() {
            self.notify(Level::Error, "Please enter a todo item!");
            return Err(TodoError::EmptyText);
        }

        let now = (self.clock)();
        let item = TodoItem::new(self.next_id(now)?, text.to_string(), now);
        debug!(id = item.id, "Adding todo");

        self.items.insert(0, item.clone());
        self.persist()?;

        self.notify(Level::Success, "Todo added successfully!");
        Ok(item)
    }

    /// Flip completion for `id`, returning the new state, or `None` if there is no such todo
    pub fn toggle(&mut self, id: i64) -> Result<Option<bool>> {
        let Some(item) = self.items.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle: no such todo");
            return Ok(None);
        };

        item.completed = !item.completed;
        let completed = item.completed;
        self.persist()?;

        Ok(Some(completed))
    }

    /// Remove `id` if present. Returns whether anything was removed.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        let removed = self.items.len() != before;
        self.persist()?;

        self.notify(Level::Info, "Todo deleted!");
        Ok(removed)
    }

    /// Replace the text of `id`
    ///
    /// Blank text is ignored without error, unlike [`add`](Self::add).
    /// Returns whether the text was replaced.
    pub fn edit(&mut self, id: i64, raw_text: &str) -> Result<bool> {
        let text = raw_text.trim();
        let Some(item) = self.items.iter_mut().find(|t| t.id == id) else {
            debug!(id, "edit: no such todo");
            return Ok(false);
        };
        if text.is_empty() {
            debug!(id, "edit: blank text discarded");
            return Ok(false);
        }

        item.text = text.to_string();
        self.persist()?;

        self.notify(Level::Success, "Todo updated!");
        Ok(true)
    }

    /// Affects subsequent [`query`](Self::query) calls only
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Remove every completed todo, returning how many were removed
    pub fn clear_completed(&mut self) -> Result<usize> {
        let before = self.items.len();
        self.items.retain(|t| !t.completed);
        let cleared = before - self.items.len();
        self.persist()?;

        if cleared > 0 {
            self.notify(Level::Info, format!("Cleared {} completed todos!", cleared));
        }
        Ok(cleared)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Items matching the current filter, in stored order
    pub fn query(&self) -> Vec<&TodoItem> {
        self.filter.apply(&self.items)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// The whole collection, newest first
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&TodoItem> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of incomplete todos
    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|t| !t.completed).count()
    }

    pub fn has_completed(&self) -> bool {
        self.items.iter().any(|t| t.completed)
    }

    /// Drain notifications queued since the last call, oldest first
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Clock time, bumped past the newest existing id so ids stay unique
    fn next_id(&self, now: i64) -> Result<i64> {
        match self.items.iter().map(|t| t.id).max() {
            Some(max) if max >= now => max.checked_add(1).ok_or(TodoError::IdsExhausted(max)),
            _ => Ok(now),
        }
    }

    fn persist(&mut self) -> Result<()> {
        let raw = codec::encode(&self.items)?;

        if let Err(e) = self.medium.save(&self.key, &raw) {
            warn!(key = %self.key, error = %e, "Failed to save todos");
            self.notify(Level::Error, "Failed to save todos!");
            return Err(e.into());
        }

        debug!(key = %self.key, count = self.items.len(), "Saved todos");
        Ok(())
    }

    fn notify(&mut self, level: Level, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() || key.len() > 64 {
            return Err(TodoError::InvalidKey(key.to_string()));
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(TodoError::InvalidKey(key.to_string()));
        }
        Ok(())
    }
}

// In-memory snapshot of the active filters.
//
// Readers grab an `Arc<FilterSnapshot>` and keep it for as long as they like;
// writers build a complete replacement and swap the pointer. A reader never
// sees a half-applied reload.

use super::filter_models::{FilterError, FilterRule};
use super::filter_store::FilterStore;
use super::matcher::CompiledFilter;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Immutable point-in-time view of the cached filters, in insertion order.
/// Patterns are compiled once, when the snapshot is built.
#[derive(Debug, Default)]
pub struct FilterSnapshot {
    filters: Vec<CompiledFilter>,
}

impl FilterSnapshot {
    fn from_rules(rules: Vec<FilterRule>) -> Self {
        let mut deduped: Vec<FilterRule> = Vec::with_capacity(rules.len());
        for rule in rules {
            match deduped.iter_mut().find(|existing| existing.id == rule.id) {
                Some(existing) => *existing = rule,
                None => deduped.push(rule),
            }
        }
        Self {
            filters: deduped.into_iter().map(CompiledFilter::new).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterRule> {
        self.filters.iter().map(CompiledFilter::rule)
    }

    pub fn compiled(&self) -> impl Iterator<Item = &CompiledFilter> {
        self.filters.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&FilterRule> {
        self.iter().find(|rule| rule.id == id)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

pub struct FilterCache {
    // Only ever held for a pointer clone or swap, never across an await.
    current: RwLock<Arc<FilterSnapshot>>,
    // Serializes reload/upsert/remove so one writer can't clobber another.
    writer: Mutex<()>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(FilterSnapshot::default())),
            writer: Mutex::new(()),
        }
    }

    /// The current snapshot. Cheap; safe to call from any number of tasks.
    pub fn snapshot(&self) -> Arc<FilterSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn swap(&self, next: FilterSnapshot) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
    }

    /// Replace the whole snapshot with the store's contents.
    ///
    /// On a store error the previous snapshot stays in place.
    pub async fn reload<S: FilterStore + ?Sized>(&self, store: &S) -> Result<usize, FilterError> {
        let _writer = self.writer.lock().await;

        let rules = store.get_all().await?;
        let next = FilterSnapshot::from_rules(rules);
        let count = next.len();
        self.swap(next);

        tracing::info!(count, "Filter cache reloaded");
        Ok(count)
    }

    /// Insert a filter, or replace the one with the same id in place.
    pub async fn upsert(&self, rule: FilterRule) {
        let _writer = self.writer.lock().await;

        let mut filters = self.snapshot().filters.clone();
        let id = rule.id;
        let compiled = CompiledFilter::new(rule);
        match filters.iter_mut().find(|existing| existing.rule().id == id) {
            Some(existing) => *existing = compiled,
            None => filters.push(compiled),
        }
        self.swap(FilterSnapshot { filters });
    }

    /// Drop a filter by id. Returns whether it was cached.
    pub async fn remove(&self, id: Uuid) -> bool {
        let _writer = self.writer.lock().await;

        let mut filters = self.snapshot().filters.clone();
        let before = filters.len();
        filters.retain(|filter| filter.rule().id != id);
        let removed = filters.len() != before;
        if removed {
            self.swap(FilterSnapshot { filters });
        }
        removed
    }
}

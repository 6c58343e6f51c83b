// Storage ports for the filter system.
//
// The core only states what it needs from persistence. SQLite and JSON
// implementations live in infra/filtering.

use super::filter_models::{FilterError, FilterRule, TriggerEvent};
use async_trait::async_trait;
use uuid::Uuid;

/// Durable record store for filters.
#[async_trait]
pub trait FilterStore: Send + Sync {
    /// Every stored filter, in the order they were created.
    async fn get_all(&self) -> Result<Vec<FilterRule>, FilterError>;

    async fn get(&self, id: Uuid) -> Result<Option<FilterRule>, FilterError>;

    /// Insert or replace a filter by id.
    async fn set(&self, rule: &FilterRule) -> Result<(), FilterError>;

    async fn remove(&self, rule: &FilterRule) -> Result<(), FilterError>;
}

// Lets the composition root pick a backend at runtime and still hand the
// service a single concrete type.
#[async_trait]
impl<T: FilterStore + ?Sized> FilterStore for Box<T> {
    async fn get_all(&self) -> Result<Vec<FilterRule>, FilterError> {
        (**self).get_all().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<FilterRule>, FilterError> {
        (**self).get(id).await
    }

    async fn set(&self, rule: &FilterRule) -> Result<(), FilterError> {
        (**self).set(rule).await
    }

    async fn remove(&self, rule: &FilterRule) -> Result<(), FilterError> {
        (**self).remove(rule).await
    }
}

/// Append-only audit log of enforced filters.
#[async_trait]
pub trait FilterEventStore: Send + Sync {
    async fn append(&self, event: &TriggerEvent) -> Result<(), FilterError>;

    /// Most recent events for one member of a guild, newest first.
    async fn events_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<TriggerEvent>, FilterError>;
}

// Discord layer - commands and event handlers.

use crate::config::BotConfig;
use crate::core::filtering::{ExampleGenerator, FilterService, FilterStore};
use crate::infra::filtering::{ConfiguredStaffRoles, SqliteFilterEventStore};
use std::sync::Arc;

#[path = "filtering/mod.rs"]
pub mod filtering;

/// The filter service as wired in main: the store backend is picked at startup.
pub type Filters = FilterService<Box<dyn FilterStore>, SqliteFilterEventStore>;

/// Shared state available to all commands and event handlers.
pub struct Data {
    pub filters: Arc<Filters>,
    pub staff_roles: Arc<ConfiguredStaffRoles>,
    pub examples: ExampleGenerator,
    pub config: Arc<BotConfig>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

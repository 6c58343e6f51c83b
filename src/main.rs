// This is the entry point of the filter bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases, config-backed lookups)
// - `discord/` = Discord-specific adapters (commands, events, enforcement)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{BotConfig, StoreBackend};
use crate::core::filtering::example_generator::DEFAULT_MAX_EXAMPLES;
use crate::core::filtering::{ExampleGenerator, FilterService, FilterSettings, FilterStore};
use crate::discord::filtering::{commands as filter_commands, events as filter_events};
use crate::discord::{Data, Error};
use crate::infra::filtering::{
    ConfiguredStaffRoles, JsonFilterStore, SqliteFilterEventStore, SqliteFilterStore,
};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Event handler for non-command Discord events.
/// New and edited messages both go through the filters.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = filter_events::handle_message(ctx, data, new_message).await {
                tracing::error!("Error filtering message: {}", e);
            }
        }
        serenity::FullEvent::MessageUpdate { new, event, .. } => {
            if let Err(e) =
                filter_events::handle_message_update(ctx, data, new.as_ref(), event).await
            {
                tracing::error!("Error filtering edited message: {}", e);
            }
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!(user = %data_about_bot.user.name, "Connected to Discord");
        }
        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // RUST_LOG wins; otherwise keep serenity's chatter down.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serenity=warn")),
        )
        .init();

    let config = BotConfig::from_env()?;

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory `{}`", config.data_dir))?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let db_url = format!("sqlite://{}/filters.db?mode=rwc", config.data_dir);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .context("Failed to connect to filter DB")?;

    let filter_store: Box<dyn FilterStore> = match config.store_backend {
        StoreBackend::Sqlite => {
            let store = SqliteFilterStore::new(pool.clone());
            store.migrate().await.context("Failed to migrate filter DB")?;
            Box::new(store)
        }
        StoreBackend::Json => {
            let path = format!("{}/filters.json", config.data_dir);
            Box::new(JsonFilterStore::new(&path).context("Failed to open filter JSON store")?)
        }
    };

    let event_store = SqliteFilterEventStore::new(pool);
    event_store
        .migrate()
        .await
        .context("Failed to migrate filter event DB")?;

    let settings = FilterSettings {
        failure_policy: config.failure_policy,
        appeal_url: config.appeal_url.clone(),
    };
    let filters = FilterService::load(filter_store, event_store, settings)
        .await
        .context("Failed to load filters")?;
    tracing::info!(
        filters = filters.snapshot().len(),
        backend = ?config.store_backend,
        "Filters loaded"
    );

    let token = config.token.clone();
    let data = Data {
        filters: Arc::new(filters),
        staff_roles: Arc::new(ConfiguredStaffRoles::new(config.staff_roles.clone())),
        examples: ExampleGenerator::new(config.example_repeat, DEFAULT_MAX_EXAMPLES),
        config: Arc::new(config),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS; // Member roles for the staff exemption

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![filter_commands::filters()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::debug!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        "Running command"
                    );
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}

// Bot configuration, read from the environment (and `.env` via dotenv).
//
// Everything except the Discord token has a default so a fresh checkout runs
// with just `DISCORD_TOKEN` set.

use crate::core::filtering::FailurePolicy;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;

/// Which backend holds the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Json,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub data_dir: String,
    pub store_backend: StoreBackend,
    /// Name of the channel trigger notifications are posted to.
    pub log_channel_name: String,
    /// Guilds the filters run in. Empty means every guild.
    pub guilds: Vec<u64>,
    pub staff_roles: HashMap<u64, u64>,
    pub appeal_url: Option<String>,
    pub failure_policy: FailurePolicy,
    pub example_repeat: u32,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token."
                )
            })?;

        let store_backend = match lookup("FILTER_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("sqlite") => StoreBackend::Sqlite,
            Some("json") => StoreBackend::Json,
            Some(other) => return Err(anyhow!("Unknown FILTER_STORE `{}`", other)),
        };

        let failure_policy = match lookup("FILTER_FAILURE_POLICY") {
            Some(value) => FailurePolicy::parse(&value)
                .ok_or_else(|| anyhow!("Unknown FILTER_FAILURE_POLICY `{}`", value))?,
            None => FailurePolicy::default(),
        };

        let example_repeat = match lookup("FILTER_EXAMPLE_REPEAT") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid FILTER_EXAMPLE_REPEAT `{}`", value))?,
            None => crate::core::filtering::example_generator::DEFAULT_MAX_REPEAT,
        };

        Ok(Self {
            token,
            data_dir: lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            store_backend,
            log_channel_name: lookup("FILTER_LOG_CHANNEL")
                .unwrap_or_else(|| "filter-logs".to_string()),
            guilds: parse_id_list(lookup("FILTER_GUILDS").as_deref().unwrap_or(""))?,
            staff_roles: parse_staff_roles(lookup("FILTER_STAFF_ROLES").as_deref().unwrap_or(""))?,
            appeal_url: lookup("FILTER_APPEAL_URL").filter(|url| !url.trim().is_empty()),
            failure_policy,
            example_repeat,
        })
    }

    /// Should filters run in this guild?
    pub fn filters_guild(&self, guild_id: u64) -> bool {
        self.guilds.is_empty() || self.guilds.contains(&guild_id)
    }
}

/// `"1,2, 3"` -> `[1, 2, 3]`
fn parse_id_list(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .with_context(|| format!("Invalid guild id `{}`", part))
        })
        .collect()
}

/// `"guild:role,guild:role"` -> map of guild id to staff role id.
fn parse_staff_roles(raw: &str) -> Result<HashMap<u64, u64>> {
    let mut roles = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (guild, role) = entry
            .split_once(':')
            .ok_or_else(|| anyhow!("Expected `guild:role` in FILTER_STAFF_ROLES, got `{}`", entry))?;
        let guild = guild
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid guild id in `{}`", entry))?;
        let role = role
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid role id in `{}`", entry))?;
        roles.insert(guild, role);
    }
    Ok(roles)
}

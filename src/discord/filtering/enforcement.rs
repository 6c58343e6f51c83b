// Discord implementations of the enforcement ports.
//
// Translates the core's primitive ids into serenity HTTP calls. No decisions
// are made here beyond what Discord itself forces on us (already-deleted
// messages, closed DMs).

use crate::core::filtering::{
    DirectNotice, FilterError, MembershipService, NotificationChannel, TriggerSummary,
};
use crate::discord::filtering::formatter::{notice_embed, staff_ping_content, trigger_embed};
use async_trait::async_trait;
use poise::serenity_prelude::{self as serenity, ChannelId, GuildId, Http, MessageId, UserId};
use std::sync::Arc;

/// Was this a 404 from Discord?
fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(http_err)
            if http_err.status_code().map(|status| status.as_u16()) == Some(404)
    )
}

fn action_failed(err: serenity::Error) -> FilterError {
    FilterError::ActionFailed(err.to_string())
}

/// Find a text channel in a guild by name.
pub async fn find_log_channel(
    http: &Http,
    guild_id: GuildId,
    name: &str,
) -> Result<Option<ChannelId>, serenity::Error> {
    let channels = guild_id.channels(http).await?;
    Ok(channels
        .values()
        .find(|c| c.kind == serenity::ChannelType::Text && c.name == name)
        .map(|c| c.id))
}

pub struct DiscordMembership {
    http: Arc<Http>,
}

impl DiscordMembership {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MembershipService for DiscordMembership {
    async fn remove_message(&self, channel_id: u64, message_id: u64) -> Result<(), FilterError> {
        match ChannelId::new(channel_id)
            .delete_message(&self.http, MessageId::new(message_id))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::debug!(message_id, "Filtered message was already gone");
                Ok(())
            }
            Err(e) => Err(action_failed(e)),
        }
    }

    async fn send_direct_message(
        &self,
        user_id: u64,
        notice: &DirectNotice,
    ) -> Result<(), FilterError> {
        let message = serenity::CreateMessage::new()
            .content(&notice.headline)
            .embed(notice_embed(notice));

        // Members with closed DMs are common; that must not stop the action.
        let sent = match UserId::new(user_id).create_dm_channel(&self.http).await {
            Ok(dm) => dm.id.send_message(&self.http, message).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            tracing::warn!(user_id, error = %e, "Could not DM filtered user");
        }
        Ok(())
    }

    async fn remove_membership(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), FilterError> {
        GuildId::new(guild_id)
            .kick_with_reason(&self.http, UserId::new(user_id), reason)
            .await
            .map_err(action_failed)
    }

    async fn ban_membership(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), FilterError> {
        GuildId::new(guild_id)
            .ban_with_reason(&self.http, UserId::new(user_id), 0, reason)
            .await
            .map_err(action_failed)
    }
}

/// Posts trigger summaries to the guild's filter log channel, found by name.
pub struct LogChannelNotifier {
    http: Arc<Http>,
    channel_name: String,
}

impl LogChannelNotifier {
    pub fn new(http: Arc<Http>, channel_name: impl Into<String>) -> Self {
        Self {
            http,
            channel_name: channel_name.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for LogChannelNotifier {
    async fn post(&self, guild_id: u64, summary: &TriggerSummary) -> Result<(), FilterError> {
        let channel = find_log_channel(&self.http, GuildId::new(guild_id), &self.channel_name)
            .await
            .map_err(action_failed)?;

        let Some(channel) = channel else {
            tracing::warn!(
                guild_id,
                channel = %self.channel_name,
                "No filter log channel in guild"
            );
            return Ok(());
        };

        let mut message = serenity::CreateMessage::new().embed(trigger_embed(summary));
        if let Some(content) = summary.staff_ping.map(staff_ping_content) {
            message = message.content(content);
        }

        channel
            .send_message(&self.http, message)
            .await
            .map_err(action_failed)?;
        Ok(())
    }
}

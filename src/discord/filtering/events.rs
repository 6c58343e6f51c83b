// Gateway event handlers that feed messages into the filter pipeline.

use crate::core::filtering::{EnforcementOutcome, Enforcer, InboundMessage};
use crate::discord::filtering::enforcement::{DiscordMembership, LogChannelNotifier};
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context, GuildId};

pub async fn handle_message(ctx: &Context, data: &Data, message: &serenity::Message) -> Result<()> {
    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };

    let member_roles = message
        .member
        .as_ref()
        .map(|m| m.roles.iter().map(|r| r.get()).collect::<Vec<_>>());

    run_filters(ctx, data, guild_id, message, member_roles).await
}

/// Edits are filtered like new messages, using the edited content.
pub async fn handle_message_update(
    ctx: &Context,
    data: &Data,
    new: Option<&serenity::Message>,
    event: &serenity::MessageUpdateEvent,
) -> Result<()> {
    // Embed-only updates carry no content change.
    if event.content.is_none() {
        return Ok(());
    }
    let Some(guild_id) = event.guild_id else {
        return Ok(());
    };
    if !data.config.filters_guild(guild_id.get()) {
        return Ok(());
    }

    let fetched;
    let message = match new {
        Some(message) => message,
        None => {
            fetched = event.channel_id.message(&ctx.http, event.id).await?;
            &fetched
        }
    };

    run_filters(ctx, data, guild_id, message, None).await
}

async fn run_filters(
    ctx: &Context,
    data: &Data,
    guild_id: GuildId,
    message: &serenity::Message,
    member_roles: Option<Vec<u64>>,
) -> Result<()> {
    if message.author.bot || !data.config.filters_guild(guild_id.get()) {
        return Ok(());
    }
    if is_staff(ctx, data, guild_id, message.author.id, member_roles).await {
        return Ok(());
    }

    let inbound = InboundMessage {
        message_id: message.id.get(),
        guild_id: guild_id.get(),
        guild_name: guild_id
            .name(&ctx.cache)
            .unwrap_or_else(|| guild_id.to_string()),
        channel_id: message.channel_id.get(),
        author_id: message.author.id.get(),
        author_tag: message.author.tag(),
        content: message.content.clone(),
    };

    let membership = DiscordMembership::new(ctx.http.clone());
    let notifier = LogChannelNotifier::new(ctx.http.clone(), &data.config.log_channel_name);
    let enforcer = Enforcer {
        membership: &membership,
        notifications: &notifier,
        roles: &*data.staff_roles,
    };

    match data.filters.handle_message(&inbound, &enforcer).await {
        EnforcementOutcome::NoMatch => {}
        EnforcementOutcome::Enforced {
            filter_id, action, ..
        } => {
            tracing::debug!(
                %filter_id,
                guild_id = inbound.guild_id,
                author_id = inbound.author_id,
                action = action.map(|a| a.readable_name()).unwrap_or("Log only"),
                "Filter enforced"
            );
        }
        EnforcementOutcome::Failed { attempted } => {
            tracing::warn!(
                guild_id = inbound.guild_id,
                message_id = inbound.message_id,
                attempted = attempted.len(),
                "No matching filter could be enforced"
            );
        }
    }

    Ok(())
}

/// Staff are exempt. Roles come from the gateway payload when present,
/// otherwise from the cache and finally the API.
async fn is_staff(
    ctx: &Context,
    data: &Data,
    guild_id: GuildId,
    user_id: serenity::UserId,
    member_roles: Option<Vec<u64>>,
) -> bool {
    use crate::core::filtering::RoleResolver;

    let guild = guild_id.get();
    if data.staff_roles.staff_role_for(guild).is_none() {
        return false;
    }

    if let Some(roles) = member_roles {
        return data.staff_roles.is_staff(guild, &roles);
    }

    let cached = ctx.cache.guild(guild_id).and_then(|g| {
        g.members
            .get(&user_id)
            .map(|m| m.roles.iter().map(|r| r.get()).collect::<Vec<_>>())
    });
    if let Some(roles) = cached {
        return data.staff_roles.is_staff(guild, &roles);
    }

    match ctx.http.get_member(guild_id, user_id).await {
        Ok(member) => {
            let roles: Vec<u64> = member.roles.iter().map(|r| r.get()).collect();
            data.staff_roles.is_staff(guild, &roles)
        }
        Err(e) => {
            tracing::debug!(
                guild_id = guild,
                user_id = user_id.get(),
                error = %e,
                "Member lookup failed"
            );
            false
        }
    }
}

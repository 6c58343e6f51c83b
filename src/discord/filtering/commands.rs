use crate::core::filtering::{
    parse_filter_id, FilterAction, FilterError, FilterRule, MatchType, FILTERS_PER_PAGE,
};
use crate::discord::filtering::enforcement::find_log_channel;
use crate::discord::filtering::formatter::{
    filter_embed, filter_pages, history_embed, DISCORD_BLURPLE, DISCORD_GREEN, DISCORD_RED,
};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum MatchTypeChoice {
    Contains,
    Exact,
    Regex,
    #[name = "Regex (contains)"]
    RegexContains,
}

impl From<MatchTypeChoice> for MatchType {
    fn from(value: MatchTypeChoice) -> Self {
        match value {
            MatchTypeChoice::Contains => MatchType::Contains,
            MatchTypeChoice::Exact => MatchType::Exact,
            MatchTypeChoice::Regex => MatchType::Regex,
            MatchTypeChoice::RegexContains => MatchType::RegexContains,
        }
    }
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum ActionChoice {
    #[name = "Delete message"]
    Delete,
    #[name = "Kick user"]
    Kick,
    #[name = "Ban user"]
    Ban,
}

impl From<ActionChoice> for FilterAction {
    fn from(value: ActionChoice) -> Self {
        match value {
            ActionChoice::Delete => FilterAction::Delete,
            ActionChoice::Kick => FilterAction::Kick,
            ActionChoice::Ban => FilterAction::Ban,
        }
    }
}

/// Manage automatic message filters.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    subcommands("create", "delete", "get", "list", "reload", "history")
)]
pub async fn filters(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Create a new filter.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Text or regular expression to match"] pattern: String,
    #[description = "How the pattern is matched"] match_type: MatchTypeChoice,
    #[description = "What to do when it matches (log only if empty)"] action: Option<ActionChoice>,
    #[description = "Ping staff when it triggers"] ping_staff: Option<bool>,
) -> Result<(), Error> {
    let created = ctx
        .data()
        .filters
        .create(
            &pattern,
            match_type.into(),
            action.map(FilterAction::from),
            ping_staff.unwrap_or(false),
        )
        .await;

    let rule = match created {
        Ok(rule) => rule,
        Err(FilterError::Validation(reason)) => return reply_ephemeral(ctx, reason).await,
        Err(e) => return Err(e.into()),
    };

    log_filter_change(ctx, "Filter created", DISCORD_GREEN, &rule).await;

    let embed = filter_embed("Filter created", DISCORD_GREEN, &[rule], &ctx.data().examples);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Delete a filter by its ID.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Filter ID"] id: String,
) -> Result<(), Error> {
    let Some(id) = parse_id_or_reply(ctx, &id).await? else {
        return Ok(());
    };

    let rule = match ctx.data().filters.delete(id).await {
        Ok(rule) => rule,
        Err(FilterError::NotFound(id)) => {
            return reply_ephemeral(ctx, format!("No such filter: `{}`", id)).await;
        }
        Err(e) => return Err(e.into()),
    };

    log_filter_change(ctx, "Filter deleted", DISCORD_RED, &rule).await;

    let embed = filter_embed("Filter deleted", DISCORD_RED, &[rule], &ctx.data().examples);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Show a filter by its ID.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn get(ctx: Context<'_>, #[description = "Filter ID"] id: String) -> Result<(), Error> {
    let Some(id) = parse_id_or_reply(ctx, &id).await? else {
        return Ok(());
    };

    let rule = match ctx.data().filters.get(id).await {
        Ok(rule) => rule,
        Err(FilterError::NotFound(id)) => {
            return reply_ephemeral(ctx, format!("No such filter: `{}`", id)).await;
        }
        Err(e) => return Err(e.into()),
    };

    let embed = filter_embed("Filter", DISCORD_BLURPLE, &[rule], &ctx.data().examples);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// List all filters, most severe first.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let pages = ctx.data().filters.list_pages(FILTERS_PER_PAGE);
    if pages.is_empty() {
        return reply_ephemeral(ctx, "No filters have been created.").await;
    }

    let rendered = filter_pages(&pages, &ctx.data().examples);
    let page_refs: Vec<&str> = rendered.iter().map(String::as_str).collect();

    poise::builtins::paginate(ctx, &page_refs).await?;
    Ok(())
}

/// Re-read all filters from storage.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn reload(ctx: Context<'_>) -> Result<(), Error> {
    let count = ctx.data().filters.reload().await?;
    reply_ephemeral(ctx, format!("Reloaded {} filters.", count)).await
}

/// Show which filters have triggered on a member recently.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Member to look up"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let events = ctx
        .data()
        .filters
        .history(guild_id, user.id.get(), HISTORY_LIMIT)
        .await?;

    let embed = history_embed(user.id.get(), &events);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

async fn parse_id_or_reply(ctx: Context<'_>, raw: &str) -> Result<Option<uuid::Uuid>, Error> {
    match parse_filter_id(raw) {
        Ok(id) => Ok(Some(id)),
        Err(FilterError::Validation(reason)) => {
            reply_ephemeral(ctx, reason).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Mirror filter changes into the guild's filter log channel.
async fn log_filter_change(ctx: Context<'_>, title: &str, color: u32, rule: &FilterRule) {
    let Some(guild_id) = ctx.guild_id() else {
        return;
    };
    let channel_name = &ctx.data().config.log_channel_name;

    let channel = match find_log_channel(ctx.http(), guild_id, channel_name).await {
        Ok(Some(channel)) => channel,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("Failed to look up filter log channel: {}", e);
            return;
        }
    };

    let embed = filter_embed(title, color, std::slice::from_ref(rule), &ctx.data().examples)
        .field(
            "Moderator",
            format!("<@{}> (`{}`)", ctx.author().id, ctx.author().tag()),
            false,
        )
        .timestamp(serenity::Timestamp::now());

    if let Err(e) = channel
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!("Failed to send filter log: {}", e);
    }
}

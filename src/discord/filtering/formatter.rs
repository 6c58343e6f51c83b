// Human-readable rendering of filters and filter events.

use crate::core::filtering::{
    DirectNotice, ExampleGenerator, FilterRule, StaffPing, TriggerEvent, TriggerSummary,
};
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateEmbedFooter};

pub const DISCORD_GREEN: u32 = 0x57F287;
pub const DISCORD_RED: u32 = 0xED4245;
pub const DISCORD_YELLOW: u32 = 0xFEE75C;
pub const DISCORD_BLURPLE: u32 = 0x5865F2;

// Embed descriptions are capped at 4096 characters by Discord.
const MAX_DESCRIPTION: usize = 4000;
// Keeps a full page of filter descriptions under MAX_DESCRIPTION in the common case.
const MAX_PATTERN_SHOWN: usize = 1000;
const MAX_EXAMPLE_SHOWN: usize = 200;

fn truncate(mut text: String, max: usize) -> String {
    if text.chars().count() > max {
        text = text.chars().take(max).collect();
        text.push_str("...");
    }
    text
}

/// Markdown description of one filter, with sample matches for regex filters.
pub fn describe_filter(rule: &FilterRule, examples: &ExampleGenerator) -> String {
    let mut text = format!(
        "__**{}**__\n\n\
         **Action:** {}\n\
         **Match type:** {}\n\
         **Ping staff:** {}\n\n\
         __**Match**__\n\n\
         ```\n{}\n```\n",
        rule.id,
        rule.action_name(),
        rule.match_type.readable_name(),
        if rule.ping_staff { "Yes" } else { "No" },
        truncate(rule.pattern.clone(), MAX_PATTERN_SHOWN)
    );

    if rule.match_type.is_regex() {
        let preview = examples.preview(&rule.pattern);
        if let Some(error) = preview.error {
            text.push_str(&format!(
                "__**Examples**__\n\n**Failed to generate examples: `{}`**\n",
                error
            ));
        } else if !preview.examples.is_empty() {
            text.push_str(&format!(
                "__**Examples**__\n\n```\n{}\n```\n",
                preview
                    .examples
                    .into_iter()
                    .map(|example| truncate(example, MAX_EXAMPLE_SHOWN))
                    .collect::<Vec<_>>()
                    .join("\n")
            ));
        }
        text.push('\n');
    }

    text
}

/// One embed description per page of filters, each within Discord's limit.
pub fn filter_pages(pages: &[Vec<FilterRule>], examples: &ExampleGenerator) -> Vec<String> {
    pages
        .iter()
        .map(|page| {
            let text: String = page
                .iter()
                .map(|rule| describe_filter(rule, examples))
                .collect();
            truncate(text, MAX_DESCRIPTION)
        })
        .collect()
}

/// One embed describing one or more filters.
pub fn filter_embed(
    title: &str,
    color: u32,
    rules: &[FilterRule],
    examples: &ExampleGenerator,
) -> CreateEmbed {
    let description: String = rules
        .iter()
        .map(|rule| describe_filter(rule, examples))
        .collect();

    CreateEmbed::new()
        .title(title)
        .color(color)
        .description(truncate(description, MAX_DESCRIPTION))
}

pub fn staff_ping_content(ping: StaffPing) -> String {
    match ping {
        StaffPing::Role(role_id) => format!("<@&{}>", role_id),
        StaffPing::Unconfigured => {
            "**Warning:** This filter shouldn't have triggered on this server! This is a bug!"
                .to_string()
        }
    }
}

pub fn message_link(guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!(
        "https://discord.com/channels/{}/{}/{}",
        guild_id, channel_id, message_id
    )
}

/// The log-channel embed for an enforced filter.
pub fn trigger_embed(summary: &TriggerSummary) -> CreateEmbed {
    let message = &summary.message;
    let filter = &summary.filter;

    CreateEmbed::new()
        .title("Filter triggered!")
        .color(DISCORD_YELLOW)
        .description(truncate(message.content.clone(), MAX_DESCRIPTION))
        .field(
            "Author",
            format!(
                "<@{}> (`{}` / `{}`)",
                message.author_id, message.author_id, message.author_tag
            ),
            true,
        )
        .field("Channel", format!("<#{}>", message.channel_id), true)
        .field(
            "Message",
            format!(
                "[`{}`]({})",
                message.message_id,
                message_link(message.guild_id, message.channel_id, message.message_id)
            ),
            true,
        )
        .field("Filter ID", format!("`{}`", filter.id), false)
        .field("Action", filter.action_name(), true)
        .field("Match Type", filter.match_type.readable_name(), true)
        .field(
            "Match String",
            format!("```\n{}\n```", truncate(filter.pattern.clone(), 1000)),
            false,
        )
        .timestamp(serenity::Timestamp::now())
}

/// The embed attached to the DM a filtered member receives.
pub fn notice_embed(notice: &DirectNotice) -> CreateEmbed {
    CreateEmbed::new()
        .description(truncate(notice.content.clone(), MAX_DESCRIPTION))
        .field(
            "Channel",
            format!("<#{}> (`{}`)", notice.channel_id, notice.channel_id),
            false,
        )
        .field("Message ID", format!("`{}`", notice.message_id), false)
}

pub fn history_embed(user_id: u64, events: &[TriggerEvent]) -> CreateEmbed {
    let description = if events.is_empty() {
        "No filter has triggered on this member.".to_string()
    } else {
        events
            .iter()
            .map(|event| {
                format!(
                    "<t:{}:R> filter `{}` in <#{}> ([message]({}))",
                    event.triggered_at.timestamp(),
                    event.filter_id,
                    event.channel_id,
                    message_link(event.guild_id, event.channel_id, event.message_id)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    CreateEmbed::new()
        .title("Filter history")
        .color(DISCORD_BLURPLE)
        .description(truncate(description, MAX_DESCRIPTION))
        .footer(CreateEmbedFooter::new(format!("User ID: {}", user_id)))
}

// Filter domain models - rules, actions, audit records.
//
// Pure domain types with no Discord dependencies. The Discord layer builds an
// `InboundMessage` from a gateway event and renders the summaries back out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// Malformed administrative input. Never reaches the matching pipeline.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A regex-kind filter whose pattern does not compile.
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// An external call failed while enforcing a filter.
    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Example generation failed: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No such filter: {0}")]
    NotFound(Uuid),
}

// ============================================================================
// ACTIONS & MATCH TYPES
// ============================================================================

/// What happens to a message (and its author) when a filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterAction {
    /// Log only.
    None,
    Delete,
    Kick,
    Ban,
}

impl FilterAction {
    /// Rank used to pick the single enforced filter when several match.
    pub fn severity(self) -> i32 {
        match self {
            FilterAction::Ban => 3,
            FilterAction::Kick => 2,
            FilterAction::Delete => 1,
            FilterAction::None => -1,
        }
    }

    pub fn readable_name(self) -> &'static str {
        match self {
            FilterAction::None => "Log only",
            FilterAction::Delete => "Delete message",
            FilterAction::Kick => "Kick user",
            FilterAction::Ban => "Ban user",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterAction::None => "NONE",
            FilterAction::Delete => "DELETE",
            FilterAction::Kick => "KICK",
            FilterAction::Ban => "BAN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NONE" => Some(FilterAction::None),
            "DELETE" => Some(FilterAction::Delete),
            "KICK" => Some(FilterAction::Kick),
            "BAN" => Some(FilterAction::Ban),
            _ => None,
        }
    }
}

/// Severity of an optional action. An absent action ranks like `None`.
pub fn action_severity(action: Option<FilterAction>) -> i32 {
    action.map_or(FilterAction::None.severity(), FilterAction::severity)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Contains,
    Exact,
    Regex,
    RegexContains,
}

impl MatchType {
    pub fn readable_name(self) -> &'static str {
        match self {
            MatchType::Contains => "Contains",
            MatchType::Exact => "Exact",
            MatchType::Regex => "Regex",
            MatchType::RegexContains => "Regex (contains)",
        }
    }

    pub fn is_regex(self) -> bool {
        matches!(self, MatchType::Regex | MatchType::RegexContains)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Contains => "CONTAINS",
            MatchType::Exact => "EXACT",
            MatchType::Regex => "REGEX",
            MatchType::RegexContains => "REGEX_CONTAINS",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CONTAINS" => Some(MatchType::Contains),
            "EXACT" => Some(MatchType::Exact),
            "REGEX" => Some(MatchType::Regex),
            "REGEX_CONTAINS" => Some(MatchType::RegexContains),
            _ => None,
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// An administrator-defined filter.
///
/// Filters are never edited in place: an update is a delete followed by a
/// create, so the id of a filter always refers to the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    pub id: Uuid,
    pub action: Option<FilterAction>,
    #[serde(default)]
    pub ping_staff: bool,
    #[serde(rename = "match")]
    pub pattern: String,
    pub match_type: MatchType,
}

impl FilterRule {
    /// Build a new filter with a fresh id.
    ///
    /// Regex patterns are not compiled here; an invalid one surfaces when the
    /// filter is evaluated.
    pub fn new(
        pattern: impl Into<String>,
        match_type: MatchType,
        action: Option<FilterAction>,
        ping_staff: bool,
    ) -> Result<Self, FilterError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(FilterError::Validation(
                "Match text must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            action,
            ping_staff,
            pattern,
            match_type,
        })
    }

    pub fn severity(&self) -> i32 {
        action_severity(self.action)
    }

    pub fn action_name(&self) -> &'static str {
        self.action.unwrap_or(FilterAction::None).readable_name()
    }
}

/// Parse an administrator-supplied filter id.
pub fn parse_filter_id(value: &str) -> Result<Uuid, FilterError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| FilterError::Validation("Please provide a valid UUID.".to_string()))
}

// ============================================================================
// MESSAGES & AUDIT
// ============================================================================

/// A chat message as seen by the filter pipeline.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub message_id: u64,
    pub guild_id: u64,
    pub guild_name: String,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_tag: String,
    pub content: String,
}

/// Audit record of one successfully enforced filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub filter_id: Uuid,
    pub guild_id: u64,
    pub author_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub triggered_at: DateTime<Utc>,
}

impl TriggerEvent {
    pub fn for_message(filter_id: Uuid, message: &InboundMessage) -> Self {
        Self {
            filter_id,
            guild_id: message.guild_id,
            author_id: message.author_id,
            channel_id: message.channel_id,
            message_id: message.message_id,
            triggered_at: Utc::now(),
        }
    }
}

/// What to do when a matched filter's action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Try the next (weaker) matching filter.
    #[default]
    ContinueOnError,
    /// Give up on the message.
    StopOnError,
}

impl FailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "continue" => Some(FailurePolicy::ContinueOnError),
            "stop" => Some(FailurePolicy::StopOnError),
            _ => None,
        }
    }
}

/// Result of running one message through the filters.
#[derive(Debug, Clone, PartialEq)]
pub enum EnforcementOutcome {
    /// No filter matched the content.
    NoMatch,
    /// A filter's action completed and was recorded.
    Enforced {
        filter_id: Uuid,
        action: Option<FilterAction>,
        event: TriggerEvent,
    },
    /// Filters matched but every attempted action failed.
    Failed { attempted: Vec<Uuid> },
}

// Ports for the chat-platform side effects of enforcement.
//
// Implemented by the Discord layer on top of serenity's HTTP client. Every
// call here may be slow or fail; the core never retries them.

use super::filter_models::{FilterError, FilterRule, InboundMessage};
use async_trait::async_trait;

/// Text sent to a member whose message tripped a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectNotice {
    pub headline: String,
    /// The original message content.
    pub content: String,
    pub channel_id: u64,
    pub message_id: u64,
}

/// How the staff should be pinged on a trigger notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffPing {
    Role(u64),
    /// The filter asks for a ping but this guild has no staff role configured.
    Unconfigured,
}

/// Everything the logging channel shows about one enforced filter.
#[derive(Debug, Clone)]
pub struct TriggerSummary {
    pub filter: FilterRule,
    pub message: InboundMessage,
    pub staff_ping: Option<StaffPing>,
}

#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Remove a message. A message that is already gone counts as removed.
    async fn remove_message(&self, channel_id: u64, message_id: u64) -> Result<(), FilterError>;

    async fn send_direct_message(
        &self,
        user_id: u64,
        notice: &DirectNotice,
    ) -> Result<(), FilterError>;

    async fn remove_membership(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), FilterError>;

    async fn ban_membership(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), FilterError>;
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn post(&self, guild_id: u64, summary: &TriggerSummary) -> Result<(), FilterError>;
}

pub trait RoleResolver: Send + Sync {
    fn staff_role_for(&self, guild_id: u64) -> Option<u64>;
}

/// The external collaborators one message's enforcement runs against.
pub struct Enforcer<'a> {
    pub membership: &'a dyn MembershipService,
    pub notifications: &'a dyn NotificationChannel,
    pub roles: &'a dyn RoleResolver,
}

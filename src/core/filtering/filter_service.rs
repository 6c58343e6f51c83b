// Filter service - the moderation pipeline for automatic filters.
//
// This service handles:
// - Administrative create / delete / get / list / reload
// - Evaluating each message against the cached filters
// - Picking the most severe matching filter and enforcing it
// - Recording an audit event and notifying staff
//
// NO Discord dependencies here. Side effects go through the ports in
// `collaborators`, storage through the ports in `filter_store`.

use super::collaborators::{DirectNotice, Enforcer, StaffPing, TriggerSummary};
use super::filter_cache::{FilterCache, FilterSnapshot};
use super::filter_models::{
    EnforcementOutcome, FailurePolicy, FilterAction, FilterError, FilterRule, InboundMessage,
    MatchType, TriggerEvent,
};
use super::filter_store::{FilterEventStore, FilterStore};
use super::matcher::CompiledFilter;
use std::sync::Arc;
use uuid::Uuid;

/// Filters shown per page in the listing.
pub const FILTERS_PER_PAGE: usize = 2;

/// Tunables for enforcement.
#[derive(Debug, Clone, Default)]
pub struct FilterSettings {
    pub failure_policy: FailurePolicy,
    /// Included in the ban notice when set.
    pub appeal_url: Option<String>,
}

pub struct FilterService<S: FilterStore, E: FilterEventStore> {
    store: S,
    events: E,
    cache: FilterCache,
    settings: FilterSettings,
}

impl<S: FilterStore, E: FilterEventStore> FilterService<S, E> {
    /// Create the service and fill the cache from the store.
    pub async fn load(store: S, events: E, settings: FilterSettings) -> Result<Self, FilterError> {
        let service = Self {
            store,
            events,
            cache: FilterCache::new(),
            settings,
        };
        service.cache.reload(&service.store).await?;
        Ok(service)
    }

    // ========================================================================
    // ADMINISTRATION
    // ========================================================================

    /// Create and persist a new filter, then make it live.
    pub async fn create(
        &self,
        pattern: &str,
        match_type: MatchType,
        action: Option<FilterAction>,
        ping_staff: bool,
    ) -> Result<FilterRule, FilterError> {
        let rule = FilterRule::new(pattern, match_type, action, ping_staff)?;
        self.store.set(&rule).await?;
        self.cache.upsert(rule.clone()).await;

        tracing::info!(
            filter_id = %rule.id,
            match_type = rule.match_type.as_str(),
            action = rule.action_name(),
            "Filter created"
        );
        Ok(rule)
    }

    /// Delete a filter by id, returning what was removed.
    pub async fn delete(&self, id: Uuid) -> Result<FilterRule, FilterError> {
        let rule = self.store.get(id).await?.ok_or(FilterError::NotFound(id))?;
        self.store.remove(&rule).await?;
        self.cache.remove(id).await;

        tracing::info!(filter_id = %id, "Filter deleted");
        Ok(rule)
    }

    pub async fn get(&self, id: Uuid) -> Result<FilterRule, FilterError> {
        self.store.get(id).await?.ok_or(FilterError::NotFound(id))
    }

    /// All cached filters, most severe first. Equal severities keep cache order.
    pub fn list(&self) -> Vec<FilterRule> {
        let snapshot = self.cache.snapshot();
        let mut rules: Vec<FilterRule> = snapshot.iter().cloned().collect();
        rules.sort_by_key(|rule| std::cmp::Reverse(rule.severity()));
        rules
    }

    /// `list()` split into fixed-size pages.
    pub fn list_pages(&self, page_size: usize) -> Vec<Vec<FilterRule>> {
        self.list()
            .chunks(page_size.max(1))
            .map(|page| page.to_vec())
            .collect()
    }

    /// Re-read every filter from the store. Returns how many are now cached.
    pub async fn reload(&self) -> Result<usize, FilterError> {
        self.cache.reload(&self.store).await
    }

    /// Recent enforcements against a member, newest first.
    pub async fn history(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<TriggerEvent>, FilterError> {
        self.events.events_for_user(guild_id, user_id, limit).await
    }

    pub fn snapshot(&self) -> Arc<FilterSnapshot> {
        self.cache.snapshot()
    }

    // ========================================================================
    // ENFORCEMENT
    // ========================================================================

    /// Run one message through the filters and enforce at most one of them.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
        enforcer: &Enforcer<'_>,
    ) -> EnforcementOutcome {
        let snapshot = self.cache.snapshot();
        let candidates = candidates_for(&snapshot, &message.content);

        if candidates.is_empty() {
            return EnforcementOutcome::NoMatch;
        }

        let mut attempted = Vec::new();
        for candidate in candidates {
            // Cheap re-check right before doing anything destructive.
            if !matches!(candidate.matches(&message.content), Ok(true)) {
                continue;
            }
            let rule = candidate.rule();

            attempted.push(rule.id);
            match self.execute_action(rule, message, enforcer).await {
                Ok(()) => return self.record(rule, message, enforcer).await,
                Err(e) => {
                    tracing::error!(
                        filter_id = %rule.id,
                        guild_id = message.guild_id,
                        message_id = message.message_id,
                        error = %e,
                        "Failed to apply filter"
                    );
                    if self.settings.failure_policy == FailurePolicy::StopOnError {
                        break;
                    }
                }
            }
        }

        EnforcementOutcome::Failed { attempted }
    }

    async fn execute_action(
        &self,
        rule: &FilterRule,
        message: &InboundMessage,
        enforcer: &Enforcer<'_>,
    ) -> Result<(), FilterError> {
        let membership = enforcer.membership;

        match rule.action.unwrap_or(FilterAction::None) {
            FilterAction::None => {}

            FilterAction::Delete => {
                let notice = self.notice(
                    message,
                    format!(
                        "The message you just sent on **{}** has been automatically removed.",
                        message.guild_name
                    ),
                );
                membership
                    .send_direct_message(message.author_id, &notice)
                    .await?;
                membership
                    .remove_message(message.channel_id, message.message_id)
                    .await?;
            }

            FilterAction::Kick => {
                membership
                    .remove_message(message.channel_id, message.message_id)
                    .await?;
                let notice = self.notice(
                    message,
                    format!(
                        "You have been kicked from **{}** for sending the below message.",
                        message.guild_name
                    ),
                );
                membership
                    .send_direct_message(message.author_id, &notice)
                    .await?;
                membership
                    .remove_membership(
                        message.guild_id,
                        message.author_id,
                        &format!("Kicked by filter: {}", rule.id),
                    )
                    .await?;
            }

            FilterAction::Ban => {
                membership
                    .remove_message(message.channel_id, message.message_id)
                    .await?;
                let mut headline = format!(
                    "You have been banned from **{}** for sending the below message.",
                    message.guild_name
                );
                if let Some(url) = &self.settings.appeal_url {
                    headline.push_str(&format!("\n\nIf you'd like to appeal your ban: {}", url));
                }
                let notice = self.notice(message, headline);
                membership
                    .send_direct_message(message.author_id, &notice)
                    .await?;
                membership
                    .ban_membership(
                        message.guild_id,
                        message.author_id,
                        &format!("Banned by filter: {}", rule.id),
                    )
                    .await?;
            }
        }

        Ok(())
    }

    fn notice(&self, message: &InboundMessage, headline: String) -> DirectNotice {
        DirectNotice {
            headline,
            content: message.content.clone(),
            channel_id: message.channel_id,
            message_id: message.message_id,
        }
    }

    /// Audit + notify after an action went through. Failures here are logged
    /// only: the action already happened and must not fall through.
    async fn record(
        &self,
        rule: &FilterRule,
        message: &InboundMessage,
        enforcer: &Enforcer<'_>,
    ) -> EnforcementOutcome {
        let event = TriggerEvent::for_message(rule.id, message);
        if let Err(e) = self.events.append(&event).await {
            tracing::error!(filter_id = %rule.id, error = %e, "Failed to record filter event");
        }

        let staff_ping = rule.ping_staff.then(|| {
            enforcer
                .roles
                .staff_role_for(message.guild_id)
                .map_or(StaffPing::Unconfigured, StaffPing::Role)
        });
        let summary = TriggerSummary {
            filter: rule.clone(),
            message: message.clone(),
            staff_ping,
        };
        if let Err(e) = enforcer.notifications.post(message.guild_id, &summary).await {
            tracing::warn!(filter_id = %rule.id, error = %e, "Failed to post filter notification");
        }

        tracing::info!(
            filter_id = %rule.id,
            guild_id = message.guild_id,
            author_id = message.author_id,
            message_id = message.message_id,
            action = rule.action_name(),
            "Filter triggered"
        );

        EnforcementOutcome::Enforced {
            filter_id: rule.id,
            action: rule.action,
            event,
        }
    }
}

/// Matching filters, most severe first; ties keep snapshot order.
fn candidates_for<'a>(snapshot: &'a FilterSnapshot, content: &str) -> Vec<&'a CompiledFilter> {
    let mut candidates: Vec<&CompiledFilter> = snapshot
        .compiled()
        .filter(|filter| match filter.matches(content) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(filter_id = %filter.rule().id, error = %e, "Skipping filter");
                false
            }
        })
        .collect();

    // `sort_by_key` is stable, which is what makes insertion order the tie-break.
    candidates.sort_by_key(|filter| std::cmp::Reverse(filter.rule().severity()));
    candidates
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filtering::{MembershipService, NotificationChannel, RoleResolver};
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::Mutex;

    /// In-memory filter store for testing. Keeps insertion order via a counter.
    struct MockFilterStore {
        rules: DashMap<Uuid, (u64, FilterRule)>,
        next: Mutex<u64>,
    }

    impl MockFilterStore {
        fn new() -> Self {
            Self {
                rules: DashMap::new(),
                next: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl FilterStore for MockFilterStore {
        async fn get_all(&self) -> Result<Vec<FilterRule>, FilterError> {
            let mut rows: Vec<(u64, FilterRule)> =
                self.rules.iter().map(|e| e.value().clone()).collect();
            rows.sort_by_key(|(order, _)| *order);
            Ok(rows.into_iter().map(|(_, rule)| rule).collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<FilterRule>, FilterError> {
            Ok(self.rules.get(&id).map(|e| e.value().1.clone()))
        }

        async fn set(&self, rule: &FilterRule) -> Result<(), FilterError> {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            self.rules.insert(rule.id, (*next, rule.clone()));
            Ok(())
        }

        async fn remove(&self, rule: &FilterRule) -> Result<(), FilterError> {
            self.rules.remove(&rule.id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockEventStore {
        events: Mutex<Vec<TriggerEvent>>,
    }

    #[async_trait]
    impl FilterEventStore for MockEventStore {
        async fn append(&self, event: &TriggerEvent) -> Result<(), FilterError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn events_for_user(
            &self,
            guild_id: u64,
            user_id: u64,
            limit: usize,
        ) -> Result<Vec<TriggerEvent>, FilterError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|e| e.guild_id == guild_id && e.author_id == user_id)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        RemoveMessage(u64),
        DirectMessage(u64, String),
        Kick(u64, String),
        Ban(u64, String),
    }

    /// Records every side effect; can be told to fail specific steps.
    #[derive(Default)]
    struct MockMembership {
        calls: Mutex<Vec<Call>>,
        fail_ban: bool,
        fail_kick: bool,
        fail_remove: bool,
    }

    impl MockMembership {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MembershipService for MockMembership {
        async fn remove_message(
            &self,
            _channel_id: u64,
            message_id: u64,
        ) -> Result<(), FilterError> {
            if self.fail_remove {
                return Err(FilterError::ActionFailed("missing permissions".into()));
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::RemoveMessage(message_id));
            Ok(())
        }

        async fn send_direct_message(
            &self,
            user_id: u64,
            notice: &DirectNotice,
        ) -> Result<(), FilterError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::DirectMessage(user_id, notice.headline.clone()));
            Ok(())
        }

        async fn remove_membership(
            &self,
            _guild_id: u64,
            user_id: u64,
            reason: &str,
        ) -> Result<(), FilterError> {
            if self.fail_kick {
                return Err(FilterError::ActionFailed("missing permissions".into()));
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Kick(user_id, reason.to_string()));
            Ok(())
        }

        async fn ban_membership(
            &self,
            _guild_id: u64,
            user_id: u64,
            reason: &str,
        ) -> Result<(), FilterError> {
            if self.fail_ban {
                return Err(FilterError::ActionFailed("missing permissions".into()));
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Ban(user_id, reason.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockNotifications {
        posted: Mutex<Vec<TriggerSummary>>,
    }

    #[async_trait]
    impl NotificationChannel for MockNotifications {
        async fn post(&self, _guild_id: u64, summary: &TriggerSummary) -> Result<(), FilterError> {
            self.posted.lock().unwrap().push(summary.clone());
            Ok(())
        }
    }

    struct StaticRoles(Option<u64>);

    impl RoleResolver for StaticRoles {
        fn staff_role_for(&self, _guild_id: u64) -> Option<u64> {
            self.0
        }
    }

    const GUILD: u64 = 100;
    const AUTHOR: u64 = 200;
    const CHANNEL: u64 = 300;
    const MESSAGE: u64 = 400;

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            message_id: MESSAGE,
            guild_id: GUILD,
            guild_name: "Test Guild".to_string(),
            channel_id: CHANNEL,
            author_id: AUTHOR,
            author_tag: "someone#0001".to_string(),
            content: content.to_string(),
        }
    }

    async fn service(
        settings: FilterSettings,
    ) -> FilterService<MockFilterStore, MockEventStore> {
        FilterService::load(MockFilterStore::new(), MockEventStore::default(), settings)
            .await
            .unwrap()
    }

    struct Harness {
        membership: MockMembership,
        notifications: MockNotifications,
        roles: StaticRoles,
    }

    impl Harness {
        fn new(membership: MockMembership) -> Self {
            Self {
                membership,
                notifications: MockNotifications::default(),
                roles: StaticRoles(Some(999)),
            }
        }

        fn enforcer(&self) -> Enforcer<'_> {
            Enforcer {
                membership: &self.membership,
                notifications: &self.notifications,
                roles: &self.roles,
            }
        }
    }

    fn recorded(svc: &FilterService<MockFilterStore, MockEventStore>) -> Vec<TriggerEvent> {
        svc.events.events.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_contains_delete_scenario() {
        let svc = service(FilterSettings::default()).await;
        let rule = svc
            .create("badword", MatchType::Contains, Some(FilterAction::Delete), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        let outcome = svc
            .handle_message(&message("this is a badword test"), &harness.enforcer())
            .await;

        assert!(matches!(outcome, EnforcementOutcome::Enforced { filter_id, .. } if filter_id == rule.id));
        let calls = harness.membership.calls();
        // Delete notifies first, then removes.
        assert!(matches!(calls[0], Call::DirectMessage(AUTHOR, _)));
        assert_eq!(calls[1], Call::RemoveMessage(MESSAGE));

        let events = recorded(&svc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].filter_id, rule.id);
        assert_eq!(events[0].channel_id, CHANNEL);
    }

    #[tokio::test]
    async fn test_regex_ban_scenario() {
        let svc = service(FilterSettings {
            appeal_url: Some("https://discord.gg/appeals".to_string()),
            ..Default::default()
        })
        .await;
        let rule = svc
            .create("^spam.*$", MatchType::Regex, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        svc.handle_message(&message("spamspamspam"), &harness.enforcer())
            .await;

        let calls = harness.membership.calls();
        assert_eq!(calls[0], Call::RemoveMessage(MESSAGE));
        match &calls[1] {
            Call::DirectMessage(AUTHOR, headline) => {
                assert!(headline.contains("https://discord.gg/appeals"))
            }
            other => panic!("expected a direct message, got {:?}", other),
        }
        assert_eq!(
            calls[2],
            Call::Ban(AUTHOR, format!("Banned by filter: {}", rule.id))
        );
        assert_eq!(recorded(&svc).len(), 1);
    }

    #[tokio::test]
    async fn test_kick_reason_references_filter() {
        let svc = service(FilterSettings::default()).await;
        let rule = svc
            .create("raid", MatchType::Exact, Some(FilterAction::Kick), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        svc.handle_message(&message("RAID"), &harness.enforcer())
            .await;

        let calls = harness.membership.calls();
        assert_eq!(calls[0], Call::RemoveMessage(MESSAGE));
        assert!(matches!(calls[1], Call::DirectMessage(AUTHOR, _)));
        assert_eq!(
            calls[2],
            Call::Kick(AUTHOR, format!("Kicked by filter: {}", rule.id))
        );
    }

    #[tokio::test]
    async fn test_only_most_severe_filter_applies() {
        let svc = service(FilterSettings::default()).await;
        svc.create("scam", MatchType::Contains, Some(FilterAction::Delete), false)
            .await
            .unwrap();
        let ban = svc
            .create("scam", MatchType::RegexContains, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        let outcome = svc
            .handle_message(&message("obvious scam link"), &harness.enforcer())
            .await;

        assert!(matches!(outcome, EnforcementOutcome::Enforced { filter_id, .. } if filter_id == ban.id));
        let events = recorded(&svc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].filter_id, ban.id);
        // The delete filter never ran its own direct message.
        let dms = harness
            .membership
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::DirectMessage(..)))
            .count();
        assert_eq!(dms, 1);
    }

    #[tokio::test]
    async fn test_invalid_regex_does_not_block_other_filters() {
        let svc = service(FilterSettings::default()).await;
        svc.create("(bad", MatchType::Regex, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        let fallback = svc
            .create("bad", MatchType::Contains, None, false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        let outcome = svc
            .handle_message(&message("(bad"), &harness.enforcer())
            .await;

        assert!(matches!(outcome, EnforcementOutcome::Enforced { filter_id, .. } if filter_id == fallback.id));
        // Log-only filter: no destructive calls.
        assert!(harness.membership.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unbalanced_regex_ban_never_fires() {
        let svc = service(FilterSettings::default()).await;
        svc.create("a)|(b", MatchType::Regex, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        for content in ["a perfectly normal message", "ends with b", "a)|(b"] {
            let outcome = svc
                .handle_message(&message(content), &harness.enforcer())
                .await;
            assert!(matches!(outcome, EnforcementOutcome::NoMatch));
        }

        assert!(harness.membership.calls().is_empty());
        assert!(recorded(&svc).is_empty());
    }

    #[tokio::test]
    async fn test_failed_action_falls_through_to_next_filter() {
        let svc = service(FilterSettings::default()).await;
        svc.create("spam", MatchType::Contains, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        let kick = svc
            .create("spam", MatchType::Contains, Some(FilterAction::Kick), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership {
            fail_ban: true,
            ..Default::default()
        });

        let outcome = svc
            .handle_message(&message("spam"), &harness.enforcer())
            .await;

        assert!(matches!(outcome, EnforcementOutcome::Enforced { filter_id, .. } if filter_id == kick.id));
        let events = recorded(&svc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].filter_id, kick.id);
    }

    #[tokio::test]
    async fn test_stop_policy_does_not_fall_through() {
        let svc = service(FilterSettings {
            failure_policy: FailurePolicy::StopOnError,
            ..Default::default()
        })
        .await;
        let ban = svc
            .create("spam", MatchType::Contains, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        svc.create("spam", MatchType::Contains, Some(FilterAction::Kick), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership {
            fail_ban: true,
            ..Default::default()
        });

        let outcome = svc
            .handle_message(&message("spam"), &harness.enforcer())
            .await;

        assert_eq!(
            outcome,
            EnforcementOutcome::Failed {
                attempted: vec![ban.id]
            }
        );
        assert!(recorded(&svc).is_empty());
    }

    #[tokio::test]
    async fn test_all_failing_records_nothing() {
        let svc = service(FilterSettings::default()).await;
        svc.create("spam", MatchType::Contains, Some(FilterAction::Delete), false)
            .await
            .unwrap();
        svc.create("spam", MatchType::Contains, Some(FilterAction::Kick), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership {
            fail_remove: true,
            ..Default::default()
        });

        let outcome = svc
            .handle_message(&message("spam"), &harness.enforcer())
            .await;

        assert!(matches!(outcome, EnforcementOutcome::Failed { ref attempted } if attempted.len() == 2));
        assert!(recorded(&svc).is_empty());
        assert!(harness.notifications.posted.lock().unwrap().is_empty());
        assert!(!harness
            .membership
            .calls()
            .iter()
            .any(|c| matches!(c, Call::RemoveMessage(_) | Call::Kick(..) | Call::Ban(..))));
    }

    #[tokio::test]
    async fn test_equal_severity_ties_follow_insertion_order() {
        let svc = service(FilterSettings::default()).await;
        let first = svc
            .create("dup", MatchType::Contains, Some(FilterAction::Delete), false)
            .await
            .unwrap();
        svc.create("dup", MatchType::RegexContains, Some(FilterAction::Delete), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        for _ in 0..3 {
            let outcome = svc
                .handle_message(&message("dup"), &harness.enforcer())
                .await;
            assert!(matches!(outcome, EnforcementOutcome::Enforced { filter_id, .. } if filter_id == first.id));
        }
    }

    #[tokio::test]
    async fn test_no_match_does_nothing() {
        let svc = service(FilterSettings::default()).await;
        svc.create("badword", MatchType::Contains, Some(FilterAction::Ban), false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());

        let outcome = svc
            .handle_message(&message("perfectly fine"), &harness.enforcer())
            .await;

        assert_eq!(outcome, EnforcementOutcome::NoMatch);
        assert!(harness.membership.calls().is_empty());
        assert!(recorded(&svc).is_empty());
    }

    #[tokio::test]
    async fn test_staff_ping() {
        let svc = service(FilterSettings::default()).await;
        svc.create("ping me", MatchType::Contains, None, true)
            .await
            .unwrap();

        let harness = Harness::new(MockMembership::default());
        svc.handle_message(&message("please ping me"), &harness.enforcer())
            .await;
        let posted = harness.notifications.posted.lock().unwrap();
        assert_eq!(posted[0].staff_ping, Some(StaffPing::Role(999)));
        drop(posted);

        let mut harness = Harness::new(MockMembership::default());
        harness.roles = StaticRoles(None);
        svc.handle_message(&message("please ping me"), &harness.enforcer())
            .await;
        let posted = harness.notifications.posted.lock().unwrap();
        assert_eq!(posted[0].staff_ping, Some(StaffPing::Unconfigured));
    }

    #[tokio::test]
    async fn test_create_reload_list() {
        let svc = service(FilterSettings::default()).await;
        let log_only = svc
            .create("hello", MatchType::Contains, None, false)
            .await
            .unwrap();
        let kick = svc
            .create("bye", MatchType::Contains, Some(FilterAction::Kick), false)
            .await
            .unwrap();

        assert_eq!(svc.reload().await.unwrap(), 2);

        let listed = svc.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, kick.id);
        assert_eq!(listed[1].id, log_only.id);

        let pages = svc.list_pages(FILTERS_PER_PAGE);
        assert_eq!(pages.len(), 1);
        assert_eq!(svc.list_pages(1).len(), 2);
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let svc = service(FilterSettings::default()).await;
        let rule = svc
            .create("x+", MatchType::Regex, Some(FilterAction::Delete), true)
            .await
            .unwrap();

        assert_eq!(svc.get(rule.id).await.unwrap(), rule);

        let deleted = svc.delete(rule.id).await.unwrap();
        assert_eq!(deleted, rule);
        assert!(matches!(svc.get(rule.id).await, Err(FilterError::NotFound(id)) if id == rule.id));
        assert!(matches!(svc.delete(rule.id).await, Err(FilterError::NotFound(_))));
        assert!(svc.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_history_returns_recorded_events() {
        let svc = service(FilterSettings::default()).await;
        svc.create("oops", MatchType::Contains, None, false)
            .await
            .unwrap();
        let harness = Harness::new(MockMembership::default());
        svc.handle_message(&message("oops"), &harness.enforcer())
            .await;

        assert_eq!(svc.history(GUILD, AUTHOR, 10).await.unwrap().len(), 1);
        assert!(svc.history(GUILD, AUTHOR + 1, 10).await.unwrap().is_empty());
    }
}

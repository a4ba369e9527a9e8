use crate::engine::context::RunContext;
use crate::platform::types::UserId;
use crate::platform::{ClientError, PlatformClient};
use crate::store::whitelist::WhitelistSet;
use crate::store::{FollowRecord, FollowStore};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    SkippedWhitelisted,
    SkippedAlreadyFollowed,
    RateLimited,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Unfollowed,
    SkippedWhitelisted,
    Failed,
}

/// Performs single follow/unfollow actions against the platform, keeping
/// the follow store durable and the session counters current.
///
/// The whitelist check here is the safety invariant: discovery-time
/// filtering only saves follow slots, this gate is what guarantees a
/// protected relationship is never touched no matter how an identity
/// reached the call site.
pub struct ActionExecutor {
    client: Arc<dyn PlatformClient>,
    store: FollowStore,
    whitelist: WhitelistSet,
    ctx: Arc<RunContext>,
    rate_limit_cooldown: Duration,
}

impl ActionExecutor {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        store: FollowStore,
        whitelist: WhitelistSet,
        ctx: Arc<RunContext>,
        rate_limit_cooldown: Duration,
    ) -> Self {
        Self {
            client,
            store,
            whitelist,
            ctx,
            rate_limit_cooldown,
        }
    }

    pub fn client(&self) -> Arc<dyn PlatformClient> {
        self.client.clone()
    }

    pub fn whitelist(&self) -> &WhitelistSet {
        &self.whitelist
    }

    pub fn store(&self) -> &FollowStore {
        &self.store
    }

    /// Follow one identity. Preconditions are checked in order and skip
    /// without any network call. A rate-limit signal blocks the worker for
    /// the fixed cooldown and is reported as `RateLimited` without a retry.
    pub async fn follow(&mut self, user_id: UserId) -> Result<FollowOutcome> {
        if self.whitelist.is_protected(user_id) {
            tracing::debug!(user_id, "whitelisted, skipping follow");
            self.ctx.update_stats(|s| s.skipped_whitelisted += 1);
            return Ok(FollowOutcome::SkippedWhitelisted);
        }
        if self.store.is_active(user_id) {
            tracing::debug!(user_id, "already followed, skipping");
            self.ctx.update_stats(|s| s.skipped_already_followed += 1);
            return Ok(FollowOutcome::SkippedAlreadyFollowed);
        }

        match self.client.follow(user_id).await {
            Ok(()) => {
                self.store.put(user_id, FollowRecord::new(Utc::now()));
                self.store.save().context("persisting follow store")?;
                self.ctx.update_stats(|s| s.followed_today += 1);
                tracing::info!(user_id, "followed");
                Ok(FollowOutcome::Followed)
            }
            Err(ClientError::RateLimited) => {
                tracing::warn!(
                    user_id,
                    cooldown_s = self.rate_limit_cooldown.as_secs(),
                    "rate limited, pausing"
                );
                tokio::time::sleep(self.rate_limit_cooldown).await;
                self.ctx.update_stats(|s| s.rate_limited += 1);
                Ok(FollowOutcome::RateLimited)
            }
            Err(e @ ClientError::ChallengeRequired) => {
                Err(e).context("follow aborted: platform requires verification")
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "follow failed");
                self.ctx.update_stats(|s| s.failed += 1);
                Ok(FollowOutcome::Failed)
            }
        }
    }

    /// Unfollow one identity. The whitelist check is absolute: no caller,
    /// including the reconciliation sweep, may bypass it.
    pub async fn unfollow(&mut self, user_id: UserId) -> Result<UnfollowOutcome> {
        if self.whitelist.is_protected(user_id) {
            tracing::warn!(user_id, "whitelisted, never unfollowing");
            self.ctx.update_stats(|s| s.skipped_whitelisted += 1);
            return Ok(UnfollowOutcome::SkippedWhitelisted);
        }

        match self.client.unfollow(user_id).await {
            Ok(()) => {
                self.store.mark_unfollowed(user_id, Utc::now());
                self.store.save().context("persisting follow store")?;
                self.ctx.update_stats(|s| s.unfollowed_today += 1);
                tracing::info!(user_id, "unfollowed");
                Ok(UnfollowOutcome::Unfollowed)
            }
            Err(e @ ClientError::ChallengeRequired) => {
                Err(e).context("unfollow aborted: platform requires verification")
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "unfollow failed");
                self.ctx.update_stats(|s| s.failed += 1);
                Ok(UnfollowOutcome::Failed)
            }
        }
    }
}

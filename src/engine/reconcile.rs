use crate::engine::context::RunContext;
use crate::engine::executor::{ActionExecutor, UnfollowOutcome};
use crate::platform::ClientError;
use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use std::time::Duration;

/// Delay between successful unfollows, seconds (inclusive).
const SWEEP_DELAY_RANGE: (u64, u64) = (30, 60);

#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    /// Records younger than this many days are left alone.
    pub grace_days: i64,
    /// Hard cap on unfollows per sweep.
    pub max_actions: u32,
}

/// Unfollow previously followed identities that did not reciprocate within
/// the grace period. One identity's query failure is logged and skipped;
/// only a verification challenge aborts the sweep.
pub async fn sweep(
    executor: &mut ActionExecutor,
    settings: &SweepSettings,
    ctx: &RunContext,
) -> Result<u32> {
    let cutoff = Utc::now() - chrono::Duration::days(settings.grace_days);
    let client = executor.client();

    let mut candidates = executor.store().active_records();
    // Oldest follows first, so long-ignored ones are reclaimed before the cap hits.
    candidates.sort_by_key(|&(_, followed_at)| followed_at);

    tracing::info!(
        grace_days = settings.grace_days,
        records = candidates.len(),
        "sweep starting"
    );

    let mut unfollowed = 0u32;
    for (user_id, followed_at) in candidates {
        if unfollowed >= settings.max_actions {
            break;
        }
        if !ctx.is_running() {
            tracing::info!("stop requested, ending sweep early");
            break;
        }
        if executor.whitelist().is_protected(user_id) {
            continue;
        }
        // Exactly grace_days old is selectable; anything newer is not.
        if followed_at > cutoff {
            continue;
        }

        let friendship = match client.get_friendship(user_id).await {
            Ok(f) => f,
            Err(e @ ClientError::ChallengeRequired) => {
                return Err(e).context("sweep aborted: platform requires verification");
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "friendship check failed, skipping");
                continue;
            }
        };
        if friendship.followed_by {
            continue;
        }

        if executor.unfollow(user_id).await? == UnfollowOutcome::Unfollowed {
            unfollowed += 1;
            let delay =
                rand::thread_rng().gen_range(SWEEP_DELAY_RANGE.0..=SWEEP_DELAY_RANGE.1);
            tracing::debug!(delay_s = delay, "sweep pacing delay");
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
    }

    tracing::info!(unfollowed, "sweep finished");
    Ok(unfollowed)
}

use crate::engine::context::RunContext;
use crate::engine::discovery::{discover, CampaignSource};
use crate::engine::executor::{ActionExecutor, FollowOutcome};
use crate::platform::types::UserId;
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Sizing and pacing for one campaign session.
#[derive(Debug, Clone, Copy)]
pub struct CampaignSettings {
    pub session_size: usize,
    /// Inclusive range of seconds slept after each successful follow.
    pub delay_range: (u64, u64),
}

/// One bounded run of follow actions against a batch of discovered
/// candidates. Returns the number of identities actually followed.
pub async fn run_campaign(
    executor: &mut ActionExecutor,
    self_id: UserId,
    sources: &[CampaignSource],
    settings: &CampaignSettings,
    ctx: &RunContext,
) -> Result<u32> {
    let client = executor.client();
    let mut candidates: Vec<UserId> = Vec::new();
    for source in sources {
        let found = discover(
            client.as_ref(),
            executor.whitelist(),
            self_id,
            source,
            settings.session_size,
        )
        .await;
        candidates.extend(found);
    }

    // Uniform shuffle so no source biases the head of the session.
    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(settings.session_size);

    tracing::info!(targets = candidates.len(), "campaign starting");

    let mut followed = 0u32;
    for user_id in candidates {
        if !ctx.is_running() {
            tracing::info!("stop requested, ending campaign early");
            break;
        }

        // The pacing delay rate-shapes successful actions only; skips and
        // failures proceed immediately.
        if executor.follow(user_id).await? == FollowOutcome::Followed {
            followed += 1;
            let delay = rand::thread_rng().gen_range(settings.delay_range.0..=settings.delay_range.1);
            tracing::debug!(delay_s = delay, "pacing delay");
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
    }

    tracing::info!(followed, "campaign finished");
    Ok(followed)
}

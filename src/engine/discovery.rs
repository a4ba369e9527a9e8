use crate::platform::types::UserId;
use crate::platform::{ClientError, PlatformClient};
use crate::store::whitelist::WhitelistSet;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// One discovery input for a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CampaignSource {
    /// Followers of another account, e.g. a competitor.
    Account(String),
    /// Authors of recent posts under a hashtag.
    Hashtag(String),
}

impl fmt::Display for CampaignSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignSource::Account(name) => write!(f, "@{}", name),
            CampaignSource::Hashtag(tag) => write!(f, "#{}", tag),
        }
    }
}

/// Discover candidate identities from one source.
///
/// Oversamples 2x the requested limit to compensate for whitelist
/// exclusions, drops protected ids and the operator's own id, truncates to
/// `limit`. A provider error yields an empty list: a dead source must not
/// kill the campaign.
pub async fn discover(
    client: &dyn PlatformClient,
    whitelist: &WhitelistSet,
    self_id: UserId,
    source: &CampaignSource,
    limit: usize,
) -> Vec<UserId> {
    let raw = match source {
        CampaignSource::Account(username) => account_followers(client, username, limit * 2).await,
        CampaignSource::Hashtag(tag) => hashtag_posters(client, tag, limit * 2).await,
    };
    let raw = match raw {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "discovery failed, skipping source");
            return Vec::new();
        }
    };

    let total = raw.len();
    let candidates: Vec<UserId> = raw
        .into_iter()
        .filter(|&id| id != self_id && !whitelist.is_protected(id))
        .take(limit)
        .collect();

    tracing::info!(
        source = %source,
        candidates = candidates.len(),
        excluded = total - candidates.len(),
        "discovery complete"
    );
    candidates
}

async fn account_followers(
    client: &dyn PlatformClient,
    username: &str,
    amount: usize,
) -> Result<Vec<UserId>, ClientError> {
    let target_id = client.resolve_user_id(username).await?;
    client.list_followers(target_id, amount).await
}

async fn hashtag_posters(
    client: &dyn PlatformClient,
    tag: &str,
    amount: usize,
) -> Result<Vec<UserId>, ClientError> {
    let medias = client.list_hashtag_recent(tag, amount).await?;
    let mut seen = HashSet::new();
    Ok(medias
        .into_iter()
        .map(|m| m.user.pk)
        .filter(|id| seen.insert(*id))
        .collect())
}

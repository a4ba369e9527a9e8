use crate::platform::types::UserId;
use crate::platform::{ClientError, PlatformClient};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Identities protected from both follow and unfollow. A point-in-time
/// snapshot of the operator's relationships plus a hand-curated set; not
/// live-synced with the platform.
pub struct WhitelistSet {
    path: PathBuf,
    followers: HashSet<UserId>,
    following: HashSet<UserId>,
    custom: HashSet<UserId>,
}

/// On-disk layout: three arrays of stringified ids.
#[derive(Default, Serialize, Deserialize)]
struct WhitelistDoc {
    #[serde(default)]
    followers: Vec<String>,
    #[serde(default)]
    following: Vec<String>,
    #[serde(default)]
    custom: Vec<String>,
}

impl WhitelistSet {
    pub fn load(path: &Path) -> Result<Self> {
        let doc = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<WhitelistDoc>(&content)
                .with_context(|| format!("malformed whitelist: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => WhitelistDoc::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read whitelist: {}", path.display()))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            followers: parse_ids(doc.followers),
            following: parse_ids(doc.following),
            custom: parse_ids(doc.custom),
        })
    }

    pub fn save(&self) -> Result<()> {
        let doc = WhitelistDoc {
            followers: to_strings(&self.followers),
            following: to_strings(&self.following),
            custom: to_strings(&self.custom),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write whitelist: {}", self.path.display()))
    }

    /// True iff the identity is in any of the three protected sets.
    pub fn is_protected(&self, user_id: UserId) -> bool {
        self.followers.contains(&user_id)
            || self.following.contains(&user_id)
            || self.custom.contains(&user_id)
    }

    /// True when neither relationship snapshot has been captured yet.
    /// `custom` does not count: it can be curated before the first login.
    pub fn is_snapshot_empty(&self) -> bool {
        self.followers.is_empty() && self.following.is_empty()
    }

    pub fn add_custom(&mut self, user_id: UserId) {
        self.custom.insert(user_id);
    }

    pub fn protected_count(&self) -> usize {
        self.followers
            .union(&self.following)
            .cloned()
            .collect::<HashSet<_>>()
            .union(&self.custom)
            .count()
    }

    /// Re-capture the followers/following snapshots from the platform.
    /// The hand-curated `custom` set is carried over unchanged. Returns
    /// the snapshot sizes.
    pub async fn rebuild(
        &mut self,
        client: &dyn PlatformClient,
        account_id: UserId,
    ) -> Result<(usize, usize), ClientError> {
        let followers = client.list_followers(account_id, usize::MAX).await?;
        let following = client.list_following(account_id).await?;
        self.followers = followers.into_iter().collect();
        self.following = following.into_iter().collect();
        tracing::info!(
            followers = self.followers.len(),
            following = self.following.len(),
            custom = self.custom.len(),
            "whitelist snapshot rebuilt"
        );
        Ok((self.followers.len(), self.following.len()))
    }
}

fn parse_ids(raw: Vec<String>) -> HashSet<UserId> {
    raw.into_iter()
        .filter_map(|s| match s.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(entry = %s, "skipping non-numeric whitelist entry");
                None
            }
        })
        .collect()
}

fn to_strings(set: &HashSet<UserId>) -> Vec<String> {
    let mut out: Vec<String> = set.iter().map(|id| id.to_string()).collect();
    out.sort();
    out
}

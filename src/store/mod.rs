pub mod whitelist;

use crate::platform::types::UserId;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Durable record of one follow action and its eventual unfollow, if any.
/// Created when a follow succeeds; mutated only to flip `unfollowed`;
/// never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowRecord {
    pub followed_at: DateTime<Utc>,
    pub unfollowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfollowed_at: Option<DateTime<Utc>>,
}

impl FollowRecord {
    pub fn new(followed_at: DateTime<Utc>) -> Self {
        Self {
            followed_at,
            unfollowed: false,
            unfollowed_at: None,
        }
    }
}

/// JSON-file store mapping stringified user ids to follow records.
/// Read-fully / write-fully on each mutation; an absent file is "empty",
/// not an error.
pub struct FollowStore {
    path: PathBuf,
    records: HashMap<UserId, FollowRecord>,
}

impl FollowStore {
    pub fn load(path: &Path) -> Result<Self> {
        let records = match std::fs::read_to_string(path) {
            Ok(content) => parse_records(&content)
                .with_context(|| format!("malformed follow store: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read follow store: {}", path.display()))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn save(&self) -> Result<()> {
        let doc: HashMap<String, &FollowRecord> = self
            .records
            .iter()
            .map(|(id, record)| (id.to_string(), record))
            .collect();
        let json = serde_json::to_string_pretty(&doc)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write follow store: {}", self.path.display()))
    }

    pub fn get(&self, user_id: UserId) -> Option<&FollowRecord> {
        self.records.get(&user_id)
    }

    pub fn put(&mut self, user_id: UserId, record: FollowRecord) {
        self.records.insert(user_id, record);
    }

    /// True if we followed this identity and have not unfollowed since.
    pub fn is_active(&self, user_id: UserId) -> bool {
        self.records.get(&user_id).is_some_and(|r| !r.unfollowed)
    }

    pub fn mark_unfollowed(&mut self, user_id: UserId, at: DateTime<Utc>) {
        if let Some(record) = self.records.get_mut(&user_id) {
            record.unfollowed = true;
            record.unfollowed_at = Some(at);
        }
    }

    /// Ids with a live follow (`unfollowed == false`) and their follow times.
    pub fn active_records(&self) -> Vec<(UserId, DateTime<Utc>)> {
        self.records
            .iter()
            .filter(|(_, r)| !r.unfollowed)
            .map(|(id, r)| (*id, r.followed_at))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One malformed record must not abort the run: entries are decoded
/// individually and the bad ones are skipped with a warning.
fn parse_records(content: &str) -> Result<HashMap<UserId, FollowRecord>> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(content)?;
    let mut records = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let user_id: UserId = match key.parse() {
            Ok(id) => id,
            Err(_) => {
                tracing::warn!(key = %key, "skipping follow record with non-numeric id");
                continue;
            }
        };
        match serde_json::from_value::<FollowRecord>(value) {
            Ok(record) => {
                records.insert(user_id, record);
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "skipping malformed follow record");
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_at(dir: &tempfile::TempDir) -> FollowStore {
        FollowStore::load(&dir.path().join("followed_users.json")).unwrap()
    }

    #[test]
    fn absent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        assert!(store.is_empty());
    }

    #[test]
    fn round_trip_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_at(&dir);
        let followed_at = Utc::now();
        store.put(9, FollowRecord::new(followed_at));
        store.put(12, FollowRecord::new(followed_at - Duration::days(5)));
        store.mark_unfollowed(12, followed_at);
        store.save().unwrap();

        let reloaded = store_at(&dir);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(9), store.get(9));
        assert_eq!(reloaded.get(12), store.get(12));
        assert!(reloaded.is_active(9));
        assert!(!reloaded.is_active(12));
    }

    #[test]
    fn mark_unfollowed_stamps_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_at(&dir);
        let followed_at = Utc::now();
        store.put(9, FollowRecord::new(followed_at));
        store.mark_unfollowed(9, Utc::now());

        let record = store.get(9).unwrap();
        assert!(record.unfollowed);
        assert!(record.unfollowed_at.unwrap() >= record.followed_at);
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("followed_users.json");
        std::fs::write(
            &path,
            r#"{
                "9": {"followed_at": "2026-08-20T10:00:00Z", "unfollowed": false},
                "10": {"followed_at": "not a timestamp", "unfollowed": false},
                "oops": {"followed_at": "2026-08-20T10:00:00Z", "unfollowed": false}
            }"#,
        )
        .unwrap();

        let store = FollowStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.is_active(9));
    }

    #[test]
    fn active_records_excludes_unfollowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_at(&dir);
        let now = Utc::now();
        store.put(1, FollowRecord::new(now));
        store.put(2, FollowRecord::new(now));
        store.mark_unfollowed(2, now);

        let active = store.active_records();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, 1);
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use insta_grow::platform::types::{
    AccountInfo, Friendship, LoginSession, MediaPost, UserId, UserShort,
};
use insta_grow::platform::{ClientError, PlatformClient};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Scripted platform client: serves canned data and records every call so
/// tests can assert on exactly what went over the wire.
#[derive(Default)]
pub struct MockClient {
    pub user_ids: HashMap<String, UserId>,
    pub followers: HashMap<UserId, Vec<UserId>>,
    pub following: HashMap<UserId, Vec<UserId>>,
    /// tag -> author ids in post order (duplicates allowed).
    pub hashtag_posts: HashMap<String, Vec<UserId>>,
    pub follows_back: HashSet<UserId>,
    pub follower_count: u64,

    pub rate_limit_on: HashSet<UserId>,
    pub fail_on: HashSet<UserId>,
    pub challenge_on: HashSet<UserId>,
    pub friendship_fail_on: HashSet<UserId>,

    pub follow_calls: Mutex<Vec<UserId>>,
    pub unfollow_calls: Mutex<Vec<UserId>>,
    pub friendship_calls: Mutex<Vec<UserId>>,
}

impl MockClient {
    pub fn recorded_follows(&self) -> Vec<UserId> {
        self.follow_calls.lock().unwrap().clone()
    }

    pub fn recorded_unfollows(&self) -> Vec<UserId> {
        self.unfollow_calls.lock().unwrap().clone()
    }

    pub fn recorded_friendship_checks(&self) -> Vec<UserId> {
        self.friendship_calls.lock().unwrap().clone()
    }
}

use insta_grow::engine::context::RunContext;
use insta_grow::engine::executor::ActionExecutor;
use insta_grow::platform::types::UserId as Id;
use insta_grow::store::whitelist::WhitelistSet;
use insta_grow::store::{FollowRecord, FollowStore};
use std::sync::Arc;
use std::time::Duration;

pub struct TestEngine {
    pub client: Arc<MockClient>,
    pub ctx: Arc<RunContext>,
    pub executor: ActionExecutor,
    pub dir: tempfile::TempDir,
}

/// Build an executor over a temp store, an optional whitelist document,
/// and pre-seeded follow records.
pub fn engine(
    client: MockClient,
    whitelist_json: &str,
    seed: Vec<(Id, FollowRecord)>,
    cooldown_s: u64,
) -> TestEngine {
    let dir = tempfile::tempdir().unwrap();

    let store_path = dir.path().join("followed_users.json");
    let mut store = FollowStore::load(&store_path).unwrap();
    for (id, record) in seed {
        store.put(id, record);
    }
    store.save().unwrap();

    let whitelist_path = dir.path().join("whitelist.json");
    if !whitelist_json.is_empty() {
        std::fs::write(&whitelist_path, whitelist_json).unwrap();
    }
    let whitelist = WhitelistSet::load(&whitelist_path).unwrap();

    let client = Arc::new(client);
    let ctx = Arc::new(RunContext::new());
    let executor = ActionExecutor::new(
        client.clone(),
        store,
        whitelist,
        ctx.clone(),
        Duration::from_secs(cooldown_s),
    );
    TestEngine {
        client,
        ctx,
        executor,
        dir,
    }
}

fn api_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl PlatformClient for MockClient {
    async fn login(&self, username: &str, _password: &str) -> Result<LoginSession, ClientError> {
        Ok(LoginSession {
            user_id: 1,
            username: username.to_string(),
        })
    }

    async fn resolve_user_id(&self, username: &str) -> Result<UserId, ClientError> {
        self.user_ids
            .get(username)
            .copied()
            .ok_or(ClientError::Api {
                status: 404,
                message: format!("unknown user {}", username),
            })
    }

    async fn list_followers(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<UserId>, ClientError> {
        Ok(self
            .followers
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn list_following(&self, user_id: UserId) -> Result<Vec<UserId>, ClientError> {
        Ok(self.following.get(&user_id).cloned().unwrap_or_default())
    }

    async fn list_hashtag_recent(
        &self,
        tag: &str,
        limit: usize,
    ) -> Result<Vec<MediaPost>, ClientError> {
        let authors = self
            .hashtag_posts
            .get(tag)
            .ok_or_else(|| api_error("unknown hashtag"))?;
        Ok(authors
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, &author)| MediaPost {
                pk: format!("media-{}", i),
                user: UserShort {
                    pk: author,
                    username: String::new(),
                },
            })
            .collect())
    }

    async fn get_account_info(&self, username: &str) -> Result<AccountInfo, ClientError> {
        Ok(AccountInfo {
            pk: 1,
            username: username.to_string(),
            follower_count: self.follower_count,
        })
    }

    async fn follow(&self, user_id: UserId) -> Result<(), ClientError> {
        self.follow_calls.lock().unwrap().push(user_id);
        if self.challenge_on.contains(&user_id) {
            return Err(ClientError::ChallengeRequired);
        }
        if self.rate_limit_on.contains(&user_id) {
            return Err(ClientError::RateLimited);
        }
        if self.fail_on.contains(&user_id) {
            return Err(api_error("follow rejected"));
        }
        Ok(())
    }

    async fn unfollow(&self, user_id: UserId) -> Result<(), ClientError> {
        self.unfollow_calls.lock().unwrap().push(user_id);
        if self.challenge_on.contains(&user_id) {
            return Err(ClientError::ChallengeRequired);
        }
        if self.fail_on.contains(&user_id) {
            return Err(api_error("unfollow rejected"));
        }
        Ok(())
    }

    async fn get_friendship(&self, user_id: UserId) -> Result<Friendship, ClientError> {
        self.friendship_calls.lock().unwrap().push(user_id);
        if self.friendship_fail_on.contains(&user_id) {
            return Err(api_error("friendship lookup failed"));
        }
        Ok(Friendship {
            followed_by: self.follows_back.contains(&user_id),
            following: true,
        })
    }
}

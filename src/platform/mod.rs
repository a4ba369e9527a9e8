pub mod rest;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use types::{AccountInfo, Friendship, LoginSession, MediaPost, UserId};

/// Signals the platform can raise. Modeled as a closed enum so the
/// executor's branching over rate-limit/challenge signals is exhaustive.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The platform demands out-of-band verification (email/SMS).
    /// Fatal to the current run; never retried automatically.
    #[error("platform challenge required: complete verification out-of-band")]
    ChallengeRequired,
    /// "Please wait a few minutes" style throttling.
    #[error("rate limited by platform")]
    RateLimited,
    #[error("platform api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Capability set of the external platform, kept narrow so tests can
/// substitute a scripted client.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ClientError>;
    async fn resolve_user_id(&self, username: &str) -> Result<UserId, ClientError>;
    /// Followers of `user_id`, up to `limit`, in listing order.
    async fn list_followers(&self, user_id: UserId, limit: usize)
        -> Result<Vec<UserId>, ClientError>;
    async fn list_following(&self, user_id: UserId) -> Result<Vec<UserId>, ClientError>;
    async fn list_hashtag_recent(&self, tag: &str, limit: usize)
        -> Result<Vec<MediaPost>, ClientError>;
    async fn get_account_info(&self, username: &str) -> Result<AccountInfo, ClientError>;
    async fn follow(&self, user_id: UserId) -> Result<(), ClientError>;
    async fn unfollow(&self, user_id: UserId) -> Result<(), ClientError>;
    async fn get_friendship(&self, user_id: UserId) -> Result<Friendship, ClientError>;
}

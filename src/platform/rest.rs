use super::types::*;
use super::{ClientError, PlatformClient};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::RwLock;

/// Page size for follower/following listings.
const LIST_PAGE_SIZE: usize = 200;

pub struct InstaRest {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl InstaRest {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    fn auth_token(&self) -> Result<String, ClientError> {
        self.token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(ClientError::Api {
                status: 401,
                message: "not logged in".to_string(),
            })
    }

    /// Map a non-success response to the error taxonomy. Rate-limit and
    /// challenge signals are detected here so callers never string-match.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        if code == 429 || body.contains("Please wait a few minutes") {
            return Err(ClientError::RateLimited);
        }
        if body.contains("challenge_required") {
            return Err(ClientError::ChallengeRequired);
        }
        Err(ClientError::Api {
            status: code,
            message: body,
        })
    }

    async fn get_authed<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let token = self.auth_token()?;
        let resp = self.client.get(url).bearer_auth(&token).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn post_authed(&self, url: &str) -> Result<(), ClientError> {
        let token = self.auth_token()?;
        let resp = self.client.post(url).bearer_auth(&token).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Paginated listing of a friendship edge ("followers" or "following").
    async fn list_friendships(
        &self,
        user_id: UserId,
        edge: &str,
        limit: usize,
    ) -> Result<Vec<UserId>, ClientError> {
        let mut ids: Vec<UserId> = Vec::new();
        let mut max_id: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/friendships/{}/{}/?count={}",
                self.base_url, user_id, edge, LIST_PAGE_SIZE
            );
            if let Some(ref cursor) = max_id {
                url.push_str(&format!("&max_id={}", cursor));
            }

            let FollowersPage { users, next_max_id } = self.get_authed(&url).await?;
            let done = users.is_empty() || next_max_id.as_deref().is_none_or(|c| c.is_empty());
            ids.extend(users.into_iter().map(|u| u.pk));
            if done || ids.len() >= limit {
                break;
            }
            max_id = next_max_id;
        }

        ids.truncate(limit);
        Ok(ids)
    }
}

#[async_trait]
impl PlatformClient for InstaRest {
    async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ClientError> {
        let url = format!("{}/accounts/login/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let parsed: LoginResponse = resp.json().await?;

        if let Ok(mut guard) = self.token.write() {
            *guard = Some(parsed.token);
        }
        tracing::debug!(user_id = parsed.user.pk, "session established");

        Ok(LoginSession {
            user_id: parsed.user.pk,
            username: parsed.user.username,
        })
    }

    async fn resolve_user_id(&self, username: &str) -> Result<UserId, ClientError> {
        Ok(self.get_account_info(username).await?.pk)
    }

    async fn list_followers(&self, user_id: UserId, limit: usize) -> Result<Vec<UserId>, ClientError> {
        self.list_friendships(user_id, "followers", limit).await
    }

    async fn list_following(&self, user_id: UserId) -> Result<Vec<UserId>, ClientError> {
        self.list_friendships(user_id, "following", usize::MAX).await
    }

    async fn list_hashtag_recent(&self, tag: &str, limit: usize) -> Result<Vec<MediaPost>, ClientError> {
        let url = format!("{}/tags/{}/recent/?count={}", self.base_url, tag, limit);
        let page: HashtagPage = self.get_authed(&url).await?;
        let mut items = page.items;
        items.truncate(limit);
        Ok(items)
    }

    async fn get_account_info(&self, username: &str) -> Result<AccountInfo, ClientError> {
        let url = format!("{}/users/{}/usernameinfo/", self.base_url, username);
        let resp: AccountInfoResponse = self.get_authed(&url).await?;
        Ok(resp.user)
    }

    async fn follow(&self, user_id: UserId) -> Result<(), ClientError> {
        let url = format!("{}/friendships/create/{}/", self.base_url, user_id);
        self.post_authed(&url).await
    }

    async fn unfollow(&self, user_id: UserId) -> Result<(), ClientError> {
        let url = format!("{}/friendships/destroy/{}/", self.base_url, user_id);
        self.post_authed(&url).await
    }

    async fn get_friendship(&self, user_id: UserId) -> Result<Friendship, ClientError> {
        let url = format!("{}/friendships/show/{}/", self.base_url, user_id);
        self.get_authed(&url).await
    }
}

use serde::Deserialize;

/// Opaque numeric platform user id. Primary key everywhere.
pub type UserId = u64;

#[derive(Debug, Clone, Deserialize)]
pub struct UserShort {
    pub pk: UserId,
    #[serde(default)]
    pub username: String,
}

/// One page of a paginated follower/following listing.
#[derive(Debug, Deserialize)]
pub struct FollowersPage {
    pub users: Vec<UserShort>,
    #[serde(default)]
    pub next_max_id: Option<String>,
}

/// A recent post under a hashtag. Only the author matters to us.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaPost {
    #[serde(default)]
    pub pk: String,
    pub user: UserShort,
}

#[derive(Debug, Deserialize)]
pub struct HashtagPage {
    pub items: Vec<MediaPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub pk: UserId,
    pub username: String,
    pub follower_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfoResponse {
    pub user: AccountInfo,
}

/// Friendship state between the operator and another account.
#[derive(Debug, Clone, Deserialize)]
pub struct Friendship {
    /// Whether the other account follows the operator back.
    pub followed_by: bool,
    #[serde(default)]
    pub following: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: UserShort,
    pub token: String,
}

/// Established login session for the operator account.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user_id: UserId,
    pub username: String,
}

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{presence, repo_types::User};

/// Outward view of a user. Credentials are never part of it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub fullname: String,
    pub confirmed: bool,
    pub avatar: Option<String>,
    #[serde(rename = "last_seen", with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
    pub is_online: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl PublicUser {
    /// Snapshot with `is_online` evaluated at `now`.
    pub fn at(user: &User, now: OffsetDateTime) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            fullname: user.fullname.clone(),
            confirmed: user.confirmed,
            avatar: user.avatar.clone(),
            last_seen: user.last_seen,
            is_online: presence::is_online_at(user.last_seen, now),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self::at(user, OffsetDateTime::now_utc())
    }
}

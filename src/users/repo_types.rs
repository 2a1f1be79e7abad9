use serde::Deserialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{presence, validation::normalize_email};

/// User record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub fullname: String,
    pub(crate) password: String, // plaintext until saved, Argon2 PHC string after
    pub(crate) password_hashed: bool,
    pub confirmed: bool,
    pub avatar: Option<String>,
    pub confirm_hash: Option<String>,
    pub last_seen: OffsetDateTime,
    pub created_at: Option<OffsetDateTime>, // set by the store
    pub updated_at: Option<OffsetDateTime>, // set by the store
}

/// Input for a new user record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub fullname: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// Builds an unsaved record. `last_seen` defaults to the moment of construction.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&input.email),
            fullname: input.fullname,
            password: input.password,
            password_hashed: false,
            confirmed: false,
            avatar: input.avatar,
            confirm_hash: None,
            last_seen: OffsetDateTime::now_utc(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_password_hashed(&self) -> bool {
        self.password_hashed
    }

    /// Replaces the credential; the next save hashes it again.
    pub fn set_password(&mut self, plain: impl Into<String>) {
        self.password = plain.into();
        self.password_hashed = false;
    }

    /// True until the record has been written by a store.
    pub fn is_new(&self) -> bool {
        self.created_at.is_none()
    }

    pub fn is_online(&self) -> bool {
        presence::is_online_at(self.last_seen, OffsetDateTime::now_utc())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use super::{errors::UserError, repo_types::User};

const USER_COLUMNS: &str = "id, email, fullname, password, password_hashed, confirmed, \
                            avatar, confirm_hash, last_seen, created_at, updated_at";

/// Persistence backend for user records. Implementations own the
/// `created_at`/`updated_at` timestamps and enforce email uniqueness.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<User, UserError>;
    async fn update(&self, user: &User) -> Result<User, UserError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<User, UserError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, fullname, password, password_hashed, confirmed,
                               avatar, confirm_hash, last_seen)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );
        let stored = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.fullname)
            .bind(&user.password)
            .bind(user.password_hashed)
            .bind(user.confirmed)
            .bind(&user.avatar)
            .bind(&user.confirm_hash)
            .bind(user.last_seen)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user.id, "insert user failed");
                UserError::from_write(e)
            })?;
        debug!(user_id = %stored.id, "user inserted");
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<User, UserError> {
        let sql = format!(
            r#"
            UPDATE users
               SET email = $2, fullname = $3, password = $4, password_hashed = $5,
                   confirmed = $6, avatar = $7, confirm_hash = $8, last_seen = $9,
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let stored = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.fullname)
            .bind(&user.password)
            .bind(user.password_hashed)
            .bind(user.confirmed)
            .bind(&user.avatar)
            .bind(&user.confirm_hash)
            .bind(user.last_seen)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user.id, "update user failed");
                UserError::from_write(e)
            })?
            .ok_or(UserError::NotFound)?;
        debug!(user_id = %stored.id, "user updated");
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

/// Process-local store with the same uniqueness and timestamp rules as Postgres.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

// mirrors the `lower(email)` unique index
fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn email_taken(users: &HashMap<Uuid, User>, user: &User) -> bool {
    users
        .values()
        .any(|other| other.id != user.id && same_email(&other.email, &user.email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if email_taken(&users, user) {
            return Err(UserError::EmailTaken);
        }
        if users.contains_key(&user.id) {
            return Err(UserError::AlreadyExists);
        }
        let now = OffsetDateTime::now_utc();
        let stored = User {
            created_at: Some(now),
            updated_at: Some(now),
            ..user.clone()
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let created_at = users
            .get(&user.id)
            .ok_or(UserError::NotFound)?
            .created_at;
        if email_taken(&users, user) {
            return Err(UserError::EmailTaken);
        }
        let stored = User {
            created_at,
            updated_at: Some(OffsetDateTime::now_utc()),
            ..user.clone()
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }
}

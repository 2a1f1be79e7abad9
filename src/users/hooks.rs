//! Pre-save hashing workflow.
//!
//! The hook never touches the record it inspects. It returns a [`PreSave`]
//! holding whatever was computed, and the caller applies it to the copy it is
//! about to write.

use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::{errors::HashError, password::Hasher, repo_types::User};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PreSave {
    pub password: Option<String>,
    pub confirm_hash: Option<String>,
}

impl PreSave {
    pub fn is_noop(&self) -> bool {
        self.password.is_none() && self.confirm_hash.is_none()
    }

    pub fn apply(self, user: &mut User) {
        if let Some(hash) = self.password {
            user.password = hash;
            user.password_hashed = true;
        }
        if let Some(token) = self.confirm_hash {
            user.confirm_hash = Some(token);
        }
    }
}

/// Hashes the password unless it already is one, then issues a confirmation
/// token unless one is present. The second hash starts only after the first
/// succeeded; any failure aborts with nothing computed being kept.
#[instrument(skip(user, hasher), fields(user_id = %user.id))]
pub async fn run_pre_save(user: &User, hasher: &dyn Hasher) -> Result<PreSave, HashError> {
    let mut out = PreSave::default();

    if !user.password_hashed {
        out.password = Some(hasher.hash(&user.password).await?);
        debug!("password hashed");
    }

    if user.confirm_hash.is_none() {
        let seed = OffsetDateTime::now_utc().unix_timestamp_nanos().to_string();
        out.confirm_hash = Some(hasher.hash(&seed).await?);
        debug!("confirm hash issued");
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::NewUser;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every input and fails on the configured call (1-based).
    #[derive(Default)]
    struct ScriptedHasher {
        calls: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl Hasher for ScriptedHasher {
        async fn hash(&self, input: &str) -> Result<String, HashError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(input.to_owned());
                calls.len()
            };
            if self.fail_on == Some(n) {
                return Err(HashError::Failed("boom".into()));
            }
            Ok(format!("h{n}:{input}"))
        }
    }

    fn fresh() -> User {
        User::new(NewUser {
            email: "ada@example.com".into(),
            fullname: "Ada".into(),
            password: "plain".into(),
            avatar: None,
        })
    }

    #[tokio::test]
    async fn fresh_record_hashes_password_then_token() {
        let hasher = ScriptedHasher::default();
        let mut user = fresh();
        let out = run_pre_save(&user, &hasher).await.expect("hook");

        let calls = hasher.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], "plain");
        assert!(calls[1].parse::<i128>().is_ok(), "token seed is a timestamp");

        out.apply(&mut user);
        assert_eq!(user.password, "h1:plain");
        assert!(user.password_hashed);
        assert!(user.confirm_hash.as_deref().unwrap().starts_with("h2:"));
    }

    #[tokio::test]
    async fn hashed_record_is_a_noop() {
        let hasher = ScriptedHasher::default();
        let mut user = fresh();
        user.password = "stored-hash".into();
        user.password_hashed = true;
        user.confirm_hash = Some("token".into());

        let out = run_pre_save(&user, &hasher).await.expect("hook");
        assert!(out.is_noop());
        assert!(hasher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_token_is_kept_while_password_is_hashed() {
        let hasher = ScriptedHasher::default();
        let mut user = fresh();
        user.confirm_hash = Some("token".into());

        let out = run_pre_save(&user, &hasher).await.expect("hook");
        out.apply(&mut user);
        assert_eq!(user.confirm_hash.as_deref(), Some("token"));
        assert_eq!(user.password, "h1:plain");
    }

    #[tokio::test]
    async fn password_failure_skips_token() {
        let hasher = ScriptedHasher {
            fail_on: Some(1),
            ..Default::default()
        };
        let user = fresh();
        assert!(run_pre_save(&user, &hasher).await.is_err());
        assert_eq!(hasher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn token_failure_reports_error() {
        let hasher = ScriptedHasher {
            fail_on: Some(2),
            ..Default::default()
        };
        let user = fresh();
        let err = run_pre_save(&user, &hasher).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(user.password, "plain");
        assert!(user.confirm_hash.is_none());
    }
}

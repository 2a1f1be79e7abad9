use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    errors::UserError,
    hooks::run_pre_save,
    password::{Argon2Hasher, Hasher},
    repo::UserStore,
    repo_types::User,
    validation::{normalize_email, validate},
};

/// Keyed mutexes so that at most one save per record id is in flight.
#[derive(Default)]
struct RecordLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl RecordLocks {
    async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            // drop entries nobody is holding or waiting on
            map.retain(|_, m| Arc::strong_count(m) > 1);
            map.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn Hasher>,
    locks: Arc<RecordLocks>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn Hasher>) -> Self {
        Self {
            store,
            hasher,
            locks: Arc::new(RecordLocks::default()),
        }
    }

    pub fn with_argon2(store: Arc<dyn UserStore>) -> Self {
        Self::new(store, Arc::new(Argon2Hasher))
    }

    /// Validates, runs the hashing hook and writes the record.
    ///
    /// On success `user` is replaced by the stored row (hashed password,
    /// confirmation token, store timestamps). On any error `user` is left
    /// exactly as it was and nothing is written.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn save(&self, user: &mut User) -> Result<(), UserError> {
        let _guard = self.locks.acquire(user.id).await;

        let mut pending = user.clone();
        pending.email = normalize_email(&pending.email);

        if let Err(e) = validate(&pending) {
            warn!(error = %e, "user validation failed");
            return Err(e.into());
        }

        let pre_save = run_pre_save(&pending, self.hasher.as_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "pre-save hashing failed");
                e
            })?;
        pre_save.apply(&mut pending);

        let stored = if pending.is_new() {
            self.store.insert(&pending).await
        } else {
            self.store.update(&pending).await
        };
        let stored = match stored {
            Ok(u) => u,
            Err(UserError::EmailTaken) => {
                warn!(email = %pending.email, "email already registered");
                return Err(UserError::EmailTaken);
            }
            Err(e) => return Err(e),
        };

        info!(email = %stored.email, "user saved");
        *user = stored;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.store
            .find_by_email(&normalize_email(email))
            .await
    }
}

use thiserror::Error;

const EMAIL_INDEX: &str = "users_email_key";
const PRIMARY_KEY: &str = "users_pkey";

/// Field-level rejection raised before anything is hashed or written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email address is required")]
    EmailRequired,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Fullname is required")]
    FullnameRequired,
    #[error("Password is required")]
    PasswordRequired,
}

#[derive(Error, Debug)]
pub enum HashError {
    #[error("hashing failed: {0}")]
    Failed(String),
    #[error("hashing task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password hashing error: {0}")]
    Hashing(#[from] HashError),
    #[error("User already exists")]
    AlreadyExists,
    #[error("User not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UserError {
    /// Maps a write error from Postgres, turning unique violations into domain errors.
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        let constraint = e
            .as_database_error()
            .filter(|db| db.is_unique_violation())
            .and_then(|db| db.constraint().map(str::to_owned));
        match constraint.as_deref() {
            Some(EMAIL_INDEX) => UserError::EmailTaken,
            Some(PRIMARY_KEY) => UserError::AlreadyExists,
            _ => UserError::Database(e),
        }
    }
}

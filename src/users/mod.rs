pub mod dto;
pub mod errors;
pub mod hooks;
pub mod password;
pub mod presence;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

pub use dto::PublicUser;
pub use errors::{HashError, UserError, ValidationError};
pub use password::{Argon2Hasher, Hasher};
pub use repo::{MemoryUserStore, PgUserStore, UserStore};
pub use repo_types::{NewUser, User};
pub use services::UserService;

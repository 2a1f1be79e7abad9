use lazy_static::lazy_static;
use regex::Regex;

use super::{errors::ValidationError, repo_types::User};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Canonical form used for storage, uniqueness and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks required fields and the email format, reporting the first failure.
/// Email uniqueness is left to the store's index.
pub fn validate(user: &User) -> Result<(), ValidationError> {
    if user.email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !is_valid_email(&user.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if user.fullname.is_empty() {
        return Err(ValidationError::FullnameRequired);
    }
    if user.password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::NewUser;

    fn user(email: &str, fullname: &str, password: &str) -> User {
        User::new(NewUser {
            email: email.into(),
            fullname: fullname.into(),
            password: password.into(),
            avatar: None,
        })
    }

    #[test]
    fn email_predicate() {
        for ok in ["user@example.com", "first.last@sub.domain.org", "a+tag@x.io"] {
            assert!(is_valid_email(ok), "should accept {ok}");
        }
        for bad in ["", "plain", "@domain.com", "user@", "user@domain", "us er@x.com", "a@b@c.com"] {
            assert!(!is_valid_email(bad), "should reject {bad}");
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Ada@Example.COM\n"), "ada@example.com");
    }

    #[test]
    fn accepts_complete_record() {
        assert_eq!(validate(&user("ada@example.com", "Ada", "secret")), Ok(()));
    }

    #[test]
    fn reports_missing_and_malformed_fields() {
        assert_eq!(
            validate(&user("", "Ada", "secret")),
            Err(ValidationError::EmailRequired)
        );
        assert_eq!(
            validate(&user("not-an-email", "Ada", "secret")),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate(&user("ada@example.com", "", "secret")),
            Err(ValidationError::FullnameRequired)
        );
        assert_eq!(
            validate(&user("ada@example.com", "Ada", "")),
            Err(ValidationError::PasswordRequired)
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(ValidationError::InvalidEmail.to_string(), "Invalid email");
        assert_eq!(
            ValidationError::FullnameRequired.to_string(),
            "Fullname is required"
        );
    }
}

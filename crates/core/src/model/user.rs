use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("invalid user role: {0}")]
    InvalidRole(String),
}

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// Role of an account: students take quizzes, administrators manage the
/// question bank and read aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Student,
    Admin,
}

impl UserRole {
    /// Storage representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Admin => "admin",
        }
    }

    /// Parses a stored role string.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidRole` for anything other than
    /// `"student"` or `"admin"`.
    pub fn parse(value: &str) -> Result<Self, UserError> {
        match value {
            "student" => Ok(UserRole::Student),
            "admin" => Ok(UserRole::Admin),
            other => Err(UserError::InvalidRole(other.to_owned())),
        }
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A registered account.
///
/// Credentials, avatars, and login bookkeeping live outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    role: UserRole,
}

impl User {
    /// Creates a new User.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyUsername` if the username is empty or
    /// whitespace-only.
    pub fn new(id: UserId, username: impl Into<String>, role: UserRole) -> Result<Self, UserError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserError::EmptyUsername);
        }

        Ok(Self {
            id,
            username: username.trim().to_owned(),
            role,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_new_rejects_empty_username() {
        let err = User::new(UserId::random(), "  ", UserRole::Student).unwrap_err();
        assert_eq!(err, UserError::EmptyUsername);
    }

    #[test]
    fn user_new_trims_username() {
        let user = User::new(UserId::random(), "  ana  ", UserRole::Student).unwrap();
        assert_eq!(user.username(), "ana");
        assert!(!user.is_admin());
    }

    #[test]
    fn role_round_trips_through_storage_string() {
        assert_eq!(UserRole::parse(UserRole::Student.as_str()).unwrap(), UserRole::Student);
        assert_eq!(UserRole::parse(UserRole::Admin.as_str()).unwrap(), UserRole::Admin);
    }

    #[test]
    fn role_parse_rejects_unknown() {
        let err = UserRole::parse("moderator").unwrap_err();
        assert!(matches!(err, UserError::InvalidRole(value) if value == "moderator"));
    }
}

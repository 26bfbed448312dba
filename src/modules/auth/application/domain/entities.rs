use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Username that would collide with the `/users/me` route.
pub const RESERVED_USERNAME: &str = "me";

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const NAME_MAX_LENGTH: usize = 150;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("static username pattern"));

//
// ──────────────────────────────────────────────────────────
// UserId
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

//
// ──────────────────────────────────────────────────────────
// Role
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid role")]
pub struct InvalidRole(pub String);

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

//
// ──────────────────────────────────────────────────────────
// Confirmation code
// ──────────────────────────────────────────────────────────
//

/// Lifecycle of the single-use signup code. Only the SHA-256 digest is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfirmationCode {
    #[default]
    NotIssued,
    Pending(String),
    Consumed,
}

impl ConfirmationCode {
    pub const STATE_NONE: &'static str = "none";
    pub const STATE_PENDING: &'static str = "pending";
    pub const STATE_CONSUMED: &'static str = "consumed";

    pub fn state(&self) -> &'static str {
        match self {
            ConfirmationCode::NotIssued => Self::STATE_NONE,
            ConfirmationCode::Pending(_) => Self::STATE_PENDING,
            ConfirmationCode::Consumed => Self::STATE_CONSUMED,
        }
    }

    pub fn hash(&self) -> Option<&str> {
        match self {
            ConfirmationCode::Pending(hash) => Some(hash),
            _ => None,
        }
    }

    /// Rebuilds the enum from its two stored columns.
    pub fn from_parts(state: &str, hash: Option<String>) -> Result<Self, String> {
        match (state, hash) {
            (Self::STATE_NONE, None) => Ok(ConfirmationCode::NotIssued),
            (Self::STATE_PENDING, Some(hash)) => Ok(ConfirmationCode::Pending(hash)),
            (Self::STATE_CONSUMED, None) => Ok(ConfirmationCode::Consumed),
            (state, hash) => Err(format!(
                "inconsistent confirmation code state '{}' (hash present: {})",
                state,
                hash.is_some()
            )),
        }
    }
}

//
// ──────────────────────────────────────────────────────────
// Username / Email
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is required")]
    Empty,

    #[error("Username must not exceed 150 characters")]
    TooLong,

    #[error("Username may contain only letters, digits and @/./+/-/_")]
    InvalidCharacters,

    #[error("Username 'me' is reserved")]
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(UsernameError::Empty);
        }

        if value.chars().count() > USERNAME_MAX_LENGTH {
            return Err(UsernameError::TooLong);
        }

        if value == RESERVED_USERNAME {
            return Err(UsernameError::Reserved);
        }

        if !USERNAME_PATTERN.is_match(value) {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Email must not exceed 254 characters")]
    TooLong,

    #[error("Enter a valid email address")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(EmailError::Empty);
        }

        if value.len() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        if !EmailAddress::is_valid(value) {
            return Err(EmailError::Invalid);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Must not exceed 150 characters")]
pub struct NameTooLong;

/// First/last name: optional, bounded.
pub fn validate_name(raw: &str) -> Result<String, NameTooLong> {
    let value = raw.trim();
    if value.chars().count() > NAME_MAX_LENGTH {
        return Err(NameTooLong);
    }
    Ok(value.to_string())
}

//
// ──────────────────────────────────────────────────────────
// User
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_staff: bool,
    pub confirmation_code: ConfirmationCode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_staff
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

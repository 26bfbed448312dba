use async_trait::async_trait;

use crate::auth::application::domain::entities::{Role, User, UserId};

#[derive(Debug, Clone)]
pub struct CreateUserData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_staff: bool,
}

impl CreateUserData {
    pub fn new(username: String, email: String) -> Self {
        Self {
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: Role::User,
            is_staff: false,
        }
    }
}

/// `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserData {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already taken")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, data: CreateUserData) -> Result<User, UserRepositoryError>;

    async fn update_user(
        &self,
        user_id: UserId,
        data: UpdateUserData,
    ) -> Result<User, UserRepositoryError>;

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepositoryError>;

    /// Stores a new pending code digest, replacing whatever was there.
    async fn issue_confirmation_code(
        &self,
        user_id: UserId,
        code_hash: String,
    ) -> Result<(), UserRepositoryError>;

    /// Atomically consumes the pending code if its digest matches.
    /// Returns `false` when nothing was pending or the digest differs.
    async fn redeem_confirmation_code(
        &self,
        user_id: UserId,
        code_hash: &str,
    ) -> Result<bool, UserRepositoryError>;

    /// Marks the code consumed regardless of its current state.
    async fn invalidate_confirmation_code(&self, user_id: UserId)
        -> Result<(), UserRepositoryError>;
}

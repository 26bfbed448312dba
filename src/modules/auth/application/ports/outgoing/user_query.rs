// application/ports/outgoing/user_query.rs
use async_trait::async_trait;

use crate::auth::application::domain::entities::{User, UserId};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UserQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Corrupt user row: {0}")]
    CorruptRow(String),
}

#[async_trait]
pub trait UserQuery: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserQueryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserQueryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserQueryError>;

    /// Ordered by username; `search` is a case-insensitive substring of the username.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<User>, UserQueryError>;
}

use async_trait::async_trait;

use crate::auth::application::domain::entities::User;
use crate::auth::application::ports::outgoing::{UserQuery, UserRepository, UserRepositoryError};
use crate::auth::application::use_cases::user_fields::{
    check_unique, conflict_fields, validate_new_user, validate_patch, NewUserInput, UserPatchInput,
};
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UserAdminError {
    #[error("Invalid user data: {0}")]
    Validation(FieldErrors),

    #[error("User not found")]
    NotFound,

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<UserRepositoryError> for UserAdminError {
    fn from(err: UserRepositoryError) -> Self {
        if let Some(fields) = conflict_fields(&err) {
            return UserAdminError::Validation(fields);
        }
        match err {
            UserRepositoryError::UserNotFound => UserAdminError::NotFound,
            other => UserAdminError::RepositoryError(other.to_string()),
        }
    }
}

/// Account management for administrators. Callers are expected to have
/// passed the `AdminOnly` endpoint check already.
#[async_trait]
pub trait IUserAdminUseCase: Send + Sync {
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<User>, UserAdminError>;

    async fn get(&self, username: &str) -> Result<User, UserAdminError>;

    async fn create(&self, input: NewUserInput) -> Result<User, UserAdminError>;

    async fn update(&self, username: &str, input: UserPatchInput) -> Result<User, UserAdminError>;

    async fn delete(&self, username: &str) -> Result<(), UserAdminError>;
}

#[derive(Clone)]
pub struct UserAdminUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    query: Q,
    repository: R,
}

impl<Q, R> UserAdminUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    pub fn new(query: Q, repository: R) -> Self {
        Self { query, repository }
    }

    async fn load(&self, username: &str) -> Result<User, UserAdminError> {
        self.query
            .find_by_username(username)
            .await
            .map_err(|e| UserAdminError::RepositoryError(e.to_string()))?
            .ok_or(UserAdminError::NotFound)
    }
}

#[async_trait]
impl<Q, R> IUserAdminUseCase for UserAdminUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<User>, UserAdminError> {
        let search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.query
            .list(search, page)
            .await
            .map_err(|e| UserAdminError::RepositoryError(e.to_string()))
    }

    async fn get(&self, username: &str) -> Result<User, UserAdminError> {
        self.load(username).await
    }

    async fn create(&self, input: NewUserInput) -> Result<User, UserAdminError> {
        let data = validate_new_user(input).map_err(UserAdminError::Validation)?;

        let conflicts = check_unique(&self.query, None, Some(&data.username), Some(&data.email))
            .await
            .map_err(|e| UserAdminError::RepositoryError(e.to_string()))?;
        if !conflicts.is_empty() {
            return Err(UserAdminError::Validation(conflicts));
        }

        Ok(self.repository.create_user(data).await?)
    }

    async fn update(&self, username: &str, input: UserPatchInput) -> Result<User, UserAdminError> {
        let user = self.load(username).await?;
        let data = validate_patch(input, true).map_err(UserAdminError::Validation)?;
        if data.is_empty() {
            return Ok(user);
        }

        let conflicts = check_unique(
            &self.query,
            Some(user.id),
            data.username.as_deref(),
            data.email.as_deref(),
        )
        .await
        .map_err(|e| UserAdminError::RepositoryError(e.to_string()))?;
        if !conflicts.is_empty() {
            return Err(UserAdminError::Validation(conflicts));
        }

        Ok(self.repository.update_user(user.id, data).await?)
    }

    async fn delete(&self, username: &str) -> Result<(), UserAdminError> {
        let user = self.load(username).await?;
        Ok(self.repository.delete_user(user.id).await?)
    }
}

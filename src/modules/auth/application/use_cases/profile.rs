use async_trait::async_trait;

use crate::auth::application::domain::entities::{User, UserId};
use crate::auth::application::ports::outgoing::{UserQuery, UserRepository, UserRepositoryError};
use crate::auth::application::use_cases::user_fields::{
    check_unique, conflict_fields, validate_patch, UserPatchInput,
};
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid profile data: {0}")]
    Validation(FieldErrors),

    #[error("User not found")]
    NotFound,

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

#[async_trait]
pub trait IProfileUseCase: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<User, ProfileError>;

    /// Self-service edit; a submitted role is ignored.
    async fn update(&self, user_id: UserId, input: UserPatchInput) -> Result<User, ProfileError>;
}

#[derive(Clone)]
pub struct ProfileUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    query: Q,
    repository: R,
}

impl<Q, R> ProfileUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    pub fn new(query: Q, repository: R) -> Self {
        Self { query, repository }
    }
}

#[async_trait]
impl<Q, R> IProfileUseCase for ProfileUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    async fn get(&self, user_id: UserId) -> Result<User, ProfileError> {
        self.query
            .find_by_id(user_id)
            .await
            .map_err(|e| ProfileError::RepositoryError(e.to_string()))?
            .ok_or(ProfileError::NotFound)
    }

    async fn update(&self, user_id: UserId, input: UserPatchInput) -> Result<User, ProfileError> {
        let data = validate_patch(input, false).map_err(ProfileError::Validation)?;
        if data.is_empty() {
            return self.get(user_id).await;
        }

        let conflicts = check_unique(
            &self.query,
            Some(user_id),
            data.username.as_deref(),
            data.email.as_deref(),
        )
        .await
        .map_err(|e| ProfileError::RepositoryError(e.to_string()))?;
        if !conflicts.is_empty() {
            return Err(ProfileError::Validation(conflicts));
        }

        self.repository
            .update_user(user_id, data)
            .await
            .map_err(|err| match conflict_fields(&err) {
                Some(fields) => ProfileError::Validation(fields),
                None => match err {
                    UserRepositoryError::UserNotFound => ProfileError::NotFound,
                    other => ProfileError::RepositoryError(other.to_string()),
                },
            })
    }
}

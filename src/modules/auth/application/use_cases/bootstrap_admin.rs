use tracing::info;

use crate::auth::application::domain::entities::{Email, Role, Username};
use crate::auth::application::ports::outgoing::{CreateUserData, UserQuery, UserRepository};
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyPresent,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BootstrapAdminError {
    #[error("Invalid bootstrap admin: {0}")]
    Validation(FieldErrors),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Ensures a staff administrator exists at startup. The account signs in
/// through the regular signup/token flow like everyone else.
pub struct BootstrapAdminUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    query: Q,
    repository: R,
}

impl<Q, R> BootstrapAdminUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    pub fn new(query: Q, repository: R) -> Self {
        Self { query, repository }
    }

    pub async fn execute(
        &self,
        username: &str,
        email: &str,
    ) -> Result<BootstrapOutcome, BootstrapAdminError> {
        let mut errors = FieldErrors::new();
        let username = errors.check("username", Username::parse(username));
        let email = errors.check("email", Email::parse(email));
        let (Some(username), Some(email)) = (username, email) else {
            return Err(BootstrapAdminError::Validation(errors));
        };

        let existing = self
            .query
            .find_by_username(username.as_str())
            .await
            .map_err(|e| BootstrapAdminError::RepositoryError(e.to_string()))?;
        if existing.is_some() {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let data = CreateUserData {
            role: Role::Admin,
            is_staff: true,
            ..CreateUserData::new(username.into_inner(), email.into_inner())
        };
        let user = self
            .repository
            .create_user(data)
            .await
            .map_err(|e| BootstrapAdminError::RepositoryError(e.to_string()))?;

        info!(username = %user.username, "Bootstrap administrator created");
        Ok(BootstrapOutcome::Created)
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::application::domain::entities::{Email, User, UserId, Username};
use crate::auth::application::ports::outgoing::{
    ConfirmationCodeGenerator, CreateUserData, UserQuery, UserRepository, UserRepositoryError,
};
use crate::auth::application::services::code_hasher::hash_confirmation_code;
use crate::shared::validation::FieldErrors;

pub const USERNAME_TAKEN: &str = "A user with that username already exists";
pub const EMAIL_TAKEN: &str = "A user with that email already exists";

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
}

/// Identity plus the plaintext code; the code is handed to the notifier
/// and never returned to the client.
#[derive(Debug, Clone)]
pub struct SignupOutput {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub confirmation_code: String,
    pub newly_created: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SignupError {
    #[error("Invalid signup data: {0}")]
    Validation(FieldErrors),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

#[async_trait]
pub trait IRequestSignupUseCase: Send + Sync {
    async fn execute(&self, input: SignupInput) -> Result<SignupOutput, SignupError>;
}

/// Creates the account on first signup, reuses it when the same
/// (username, email) pair signs up again, and issues a fresh code either way.
#[derive(Clone)]
pub struct RequestSignupUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    query: Q,
    repository: R,
    code_generator: Arc<dyn ConfirmationCodeGenerator + Send + Sync>,
}

impl<Q, R> RequestSignupUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    pub fn new(
        query: Q,
        repository: R,
        code_generator: Arc<dyn ConfirmationCodeGenerator + Send + Sync>,
    ) -> Self {
        Self {
            query,
            repository,
            code_generator,
        }
    }

    async fn lookup(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<(Option<User>, Option<User>), SignupError> {
        let by_username = self
            .query
            .find_by_username(username.as_str())
            .await
            .map_err(|e| SignupError::RepositoryError(e.to_string()))?;
        let by_email = self
            .query
            .find_by_email(email.as_str())
            .await
            .map_err(|e| SignupError::RepositoryError(e.to_string()))?;
        Ok((by_username, by_email))
    }

    async fn find_or_create(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<(User, bool), SignupError> {
        match self.lookup(username, email).await? {
            (Some(user), Some(same)) if user.id == same.id => Ok((user, false)),
            (None, None) => {
                let data = CreateUserData::new(
                    username.as_str().to_string(),
                    email.as_str().to_string(),
                );
                match self.repository.create_user(data).await {
                    Ok(user) => Ok((user, true)),
                    // Lost the insert to a concurrent signup; the winner may be the same pair.
                    Err(
                        conflict @ (UserRepositoryError::UsernameTaken
                        | UserRepositoryError::EmailTaken),
                    ) => match self.lookup(username, email).await? {
                        (Some(user), Some(same)) if user.id == same.id => Ok((user, false)),
                        (None, None) => Err(SignupError::Validation(match conflict {
                            UserRepositoryError::EmailTaken => {
                                FieldErrors::single("email", EMAIL_TAKEN)
                            }
                            _ => FieldErrors::single("username", USERNAME_TAKEN),
                        })),
                        (by_username, by_email) => Err(taken(&by_username, &by_email)),
                    },
                    Err(e) => Err(SignupError::RepositoryError(e.to_string())),
                }
            }
            (by_username, by_email) => Err(taken(&by_username, &by_email)),
        }
    }
}

fn taken(by_username: &Option<User>, by_email: &Option<User>) -> SignupError {
    let mut errors = FieldErrors::new();
    if by_username.is_some() {
        errors.add("username", USERNAME_TAKEN);
    }
    if by_email.is_some() {
        errors.add("email", EMAIL_TAKEN);
    }
    SignupError::Validation(errors)
}

#[async_trait]
impl<Q, R> IRequestSignupUseCase for RequestSignupUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    async fn execute(&self, input: SignupInput) -> Result<SignupOutput, SignupError> {
        // 1. Validate identity
        let mut errors = FieldErrors::new();
        let username = errors.check("username", Username::parse(&input.username));
        let email = errors.check("email", Email::parse(&input.email));
        let (Some(username), Some(email)) = (username, email) else {
            return Err(SignupError::Validation(errors));
        };

        // 2. Existing pair or new account
        let (user, newly_created) = self.find_or_create(&username, &email).await?;

        // 3. Fresh code; replaces any earlier pending one
        let code = self.code_generator.generate();
        self.repository
            .issue_confirmation_code(user.id, hash_confirmation_code(&code))
            .await
            .map_err(|e| SignupError::RepositoryError(e.to_string()))?;

        Ok(SignupOutput {
            user_id: user.id,
            username: user.username,
            email: user.email,
            confirmation_code: code,
            newly_created,
        })
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::application::ports::outgoing::{TokenProvider, UserQuery, UserRepository};
use crate::auth::application::services::code_hasher::hash_confirmation_code;
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone)]
pub struct ObtainTokenInput {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Clone)]
pub struct ObtainTokenOutput {
    pub token: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ObtainTokenError {
    #[error("Invalid token request: {0}")]
    Validation(FieldErrors),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or already used confirmation code")]
    InvalidConfirmationCode,

    #[error("Token generation failed: {0}")]
    TokenGenerationFailed(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

#[async_trait]
pub trait IObtainTokenUseCase: Send + Sync {
    async fn execute(&self, input: ObtainTokenInput) -> Result<ObtainTokenOutput, ObtainTokenError>;
}

/// Exchanges a pending confirmation code for an access token.
///
/// The code is consumed by a single conditional update, so of several
/// concurrent exchanges only one can succeed. Any failed attempt also
/// consumes the code: after a mismatch the user has to sign up again.
#[derive(Clone)]
pub struct ObtainTokenUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    query: Q,
    repository: R,
    token_provider: Arc<dyn TokenProvider + Send + Sync>,
}

impl<Q, R> ObtainTokenUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    pub fn new(
        query: Q,
        repository: R,
        token_provider: Arc<dyn TokenProvider + Send + Sync>,
    ) -> Self {
        Self {
            query,
            repository,
            token_provider,
        }
    }
}

#[async_trait]
impl<Q, R> IObtainTokenUseCase for ObtainTokenUseCase<Q, R>
where
    Q: UserQuery + Send + Sync,
    R: UserRepository + Send + Sync,
{
    async fn execute(&self, input: ObtainTokenInput) -> Result<ObtainTokenOutput, ObtainTokenError> {
        let username = input.username.trim();
        let code = input.confirmation_code.trim();

        let mut errors = FieldErrors::new();
        if username.is_empty() {
            errors.add("username", "This field is required");
        }
        if code.is_empty() {
            errors.add("confirmation_code", "This field is required");
        }
        errors.into_result().map_err(ObtainTokenError::Validation)?;

        let user = self
            .query
            .find_by_username(username)
            .await
            .map_err(|e| ObtainTokenError::RepositoryError(e.to_string()))?
            .ok_or(ObtainTokenError::UserNotFound)?;

        let redeemed = self
            .repository
            .redeem_confirmation_code(user.id, &hash_confirmation_code(code))
            .await
            .map_err(|e| ObtainTokenError::RepositoryError(e.to_string()))?;

        if !redeemed {
            self.repository
                .invalidate_confirmation_code(user.id)
                .await
                .map_err(|e| ObtainTokenError::RepositoryError(e.to_string()))?;
            return Err(ObtainTokenError::InvalidConfirmationCode);
        }

        let token = self
            .token_provider
            .generate_access_token(user.id.value())
            .map_err(|e| ObtainTokenError::TokenGenerationFailed(e.to_string()))?;

        Ok(ObtainTokenOutput { token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::application::domain::entities::ConfirmationCode;
    use crate::auth::application::ports::outgoing::{TokenClaims, TokenError};
    use crate::auth::application::use_cases::request_signup::{
        IRequestSignupUseCase, RequestSignupUseCase, SignupInput,
    };
    use crate::tests::support::in_memory_users::InMemoryUsers;
    use crate::tests::support::stubs::{SequenceCodeGenerator, StubTokenProvider};
    use mockall::mock;
    use uuid::Uuid;

    mock! {
        pub FailingTokenProvider {}
        impl TokenProvider for FailingTokenProvider {
            fn generate_access_token(&self, user_id: Uuid) -> Result<String, TokenError>;
            fn verify_access_token(&self, token: &str) -> Result<TokenClaims, TokenError>;
        }
    }

    struct Harness {
        users: InMemoryUsers,
        signup: RequestSignupUseCase<InMemoryUsers, InMemoryUsers>,
        exchange: ObtainTokenUseCase<InMemoryUsers, InMemoryUsers>,
    }

    fn harness() -> Harness {
        let users = InMemoryUsers::new();
        Harness {
            signup: RequestSignupUseCase::new(
                users.clone(),
                users.clone(),
                Arc::new(SequenceCodeGenerator::new()),
            ),
            exchange: ObtainTokenUseCase::new(
                users.clone(),
                users.clone(),
                Arc::new(StubTokenProvider::new(Uuid::nil())),
            ),
            users,
        }
    }

    async fn signup(h: &Harness, username: &str, email: &str) -> String {
        h.signup
            .execute(SignupInput {
                username: username.into(),
                email: email.into(),
            })
            .await
            .unwrap()
            .confirmation_code
    }

    fn exchange_input(username: &str, code: &str) -> ObtainTokenInput {
        ObtainTokenInput {
            username: username.into(),
            confirmation_code: code.into(),
        }
    }

    #[tokio::test]
    async fn correct_code_yields_token_and_is_consumed() {
        let h = harness();
        let code = signup(&h, "alice", "a@x.com").await;

        let out = h.exchange.execute(exchange_input("alice", &code)).await.unwrap();

        assert!(!out.token.is_empty());
        assert_eq!(
            h.users.by_username("alice").unwrap().confirmation_code,
            ConfirmationCode::Consumed
        );
    }

    #[tokio::test]
    async fn wrong_then_right_then_replay() {
        let h = harness();
        let code = signup(&h, "alice", "a@x.com").await;

        let wrong = h.exchange.execute(exchange_input("alice", "WRONG123")).await;
        assert!(matches!(wrong, Err(ObtainTokenError::InvalidConfirmationCode)));

        // The mismatch consumed the code, so the correct one no longer works.
        let right = h.exchange.execute(exchange_input("alice", &code)).await;
        assert!(matches!(right, Err(ObtainTokenError::InvalidConfirmationCode)));
    }

    #[tokio::test]
    async fn fresh_signup_then_correct_code_then_replay() {
        let h = harness();
        let code = signup(&h, "alice", "a@x.com").await;

        assert!(h.exchange.execute(exchange_input("alice", &code)).await.is_ok());

        let replay = h.exchange.execute(exchange_input("alice", &code)).await;
        assert!(matches!(replay, Err(ObtainTokenError::InvalidConfirmationCode)));
    }

    #[tokio::test]
    async fn concurrent_exchanges_of_one_code_succeed_once() {
        let h = harness();
        let code = signup(&h, "alice", "a@x.com").await;

        let (first, second) = tokio::join!(
            h.exchange.execute(exchange_input("alice", &code)),
            h.exchange.execute(exchange_input("alice", &code)),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            matches!(first, Err(ObtainTokenError::InvalidConfirmationCode))
                || matches!(second, Err(ObtainTokenError::InvalidConfirmationCode))
        );
        assert_eq!(
            h.users.by_username("alice").unwrap().confirmation_code,
            ConfirmationCode::Consumed
        );
    }

    #[tokio::test]
    async fn only_latest_code_is_accepted() {
        let h = harness();
        let first = signup(&h, "alice", "a@x.com").await;
        let second = signup(&h, "alice", "a@x.com").await;

        let stale = h.exchange.execute(exchange_input("alice", &first)).await;
        assert!(matches!(stale, Err(ObtainTokenError::InvalidConfirmationCode)));

        // The stale attempt burned the pending code; re-signup issues a new one.
        let third = signup(&h, "alice", "a@x.com").await;
        assert_ne!(second, third);
        assert!(h.exchange.execute(exchange_input("alice", &third)).await.is_ok());
    }

    #[tokio::test]
    async fn latest_code_succeeds_when_used_first() {
        let h = harness();
        let _first = signup(&h, "alice", "a@x.com").await;
        let second = signup(&h, "alice", "a@x.com").await;

        assert!(h.exchange.execute(exchange_input("alice", &second)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let h = harness();

        let result = h.exchange.execute(exchange_input("ghost", "ABCD1234")).await;

        assert!(matches!(result, Err(ObtainTokenError::UserNotFound)));
    }

    #[tokio::test]
    async fn code_never_issued_is_rejected() {
        let h = harness();
        h.users
            .insert(crate::tests::support::fixtures::sample_user("bob", "b@x.com"));

        let result = h.exchange.execute(exchange_input("bob", "ABCD1234")).await;

        assert!(matches!(result, Err(ObtainTokenError::InvalidConfirmationCode)));
        assert_eq!(
            h.users.by_username("bob").unwrap().confirmation_code,
            ConfirmationCode::Consumed
        );
    }

    #[tokio::test]
    async fn blank_fields_are_validation_errors() {
        let h = harness();

        match h.exchange.execute(exchange_input(" ", "")).await {
            Err(ObtainTokenError::Validation(errors)) => {
                assert!(errors.contains("username"));
                assert!(errors.contains("confirmation_code"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn token_failure_is_reported() {
        let users = InMemoryUsers::new();
        let signup_uc = RequestSignupUseCase::new(
            users.clone(),
            users.clone(),
            Arc::new(SequenceCodeGenerator::new()),
        );
        let code = signup_uc
            .execute(SignupInput {
                username: "alice".into(),
                email: "a@x.com".into(),
            })
            .await
            .unwrap()
            .confirmation_code;

        let mut provider = MockFailingTokenProvider::new();
        provider
            .expect_generate_access_token()
            .returning(|_| Err(TokenError::EncodingError("boom".into())));

        let uc = ObtainTokenUseCase::new(users.clone(), users, Arc::new(provider));
        let result = uc.execute(exchange_input("alice", &code)).await;

        assert!(matches!(result, Err(ObtainTokenError::TokenGenerationFailed(_))));
    }
}

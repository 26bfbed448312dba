use std::sync::Arc;

use crate::auth::application::domain::entities::UserId;
use crate::auth::application::domain::permissions::Principal;
use crate::auth::application::ports::outgoing::user_query::{UserQuery, UserQueryError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveCallerError {
    #[error("User not found")]
    NotFound,

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Turns the subject of a verified token into the account as it is stored now,
/// so role changes and deletions take effect on the next request.
#[derive(Clone)]
pub struct CallerResolver {
    user_query: Arc<dyn UserQuery + Send + Sync>,
}

impl CallerResolver {
    pub fn new(user_query: Arc<dyn UserQuery + Send + Sync>) -> Self {
        Self { user_query }
    }

    pub async fn resolve(&self, user_id: UserId) -> Result<Principal, ResolveCallerError> {
        match self.user_query.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(Principal::from(&user)),
            Ok(None) => Err(ResolveCallerError::NotFound),
            Err(UserQueryError::DatabaseError(msg)) | Err(UserQueryError::CorruptRow(msg)) => {
                Err(ResolveCallerError::RepositoryError(msg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::application::domain::entities::Role;
    use crate::tests::support::fixtures::sample_user;
    use crate::tests::support::in_memory_users::InMemoryUsers;

    #[tokio::test]
    async fn resolves_principal_with_current_role() {
        let users = InMemoryUsers::new();
        let mut user = sample_user("alice", "alice@example.com");
        user.role = Role::Moderator;
        users.insert(user.clone());

        let resolver = CallerResolver::new(Arc::new(users));
        let principal = resolver.resolve(user.id).await.unwrap();

        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.role, Role::Moderator);
        assert!(!principal.is_staff);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let resolver = CallerResolver::new(Arc::new(InMemoryUsers::new()));

        let result = resolver.resolve(UserId::new()).await;

        assert!(matches!(result, Err(ResolveCallerError::NotFound)));
    }

    #[tokio::test]
    async fn query_failure_is_repository_error() {
        let users = InMemoryUsers::new();
        users.fail_queries("db down");
        let resolver = CallerResolver::new(Arc::new(users));

        match resolver.resolve(UserId::new()).await {
            Err(ResolveCallerError::RepositoryError(msg)) => assert!(msg.contains("db down")),
            other => panic!("Expected RepositoryError, got {:?}", other),
        }
    }
}

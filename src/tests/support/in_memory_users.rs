use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::application::domain::entities::{ConfirmationCode, User, UserId};
use crate::auth::application::ports::outgoing::{
    CreateUserData, UpdateUserData, UserQuery, UserQueryError, UserRepository,
    UserRepositoryError,
};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Default)]
struct State {
    users: Vec<User>,
    query_error: Option<String>,
    write_error: Option<String>,
}

/// Shared-state fake implementing both user ports, so a use case sees its own writes.
#[derive(Clone, Default)]
pub struct InMemoryUsers {
    state: Arc<Mutex<State>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        for user in users {
            store.insert(user);
        }
        store
    }

    pub fn insert(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn by_username(&self, username: &str) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn fail_queries(&self, msg: &str) {
        self.state.lock().unwrap().query_error = Some(msg.to_string());
    }

    pub fn fail_writes(&self, msg: &str) {
        self.state.lock().unwrap().write_error = Some(msg.to_string());
    }

    fn check_query(&self) -> Result<(), UserQueryError> {
        match &self.state.lock().unwrap().query_error {
            Some(msg) => Err(UserQueryError::DatabaseError(msg.clone())),
            None => Ok(()),
        }
    }

    fn check_write(&self) -> Result<(), UserRepositoryError> {
        match &self.state.lock().unwrap().write_error {
            Some(msg) => Err(UserRepositoryError::DatabaseError(msg.clone())),
            None => Ok(()),
        }
    }

    fn with_user<T>(
        &self,
        id: UserId,
        f: impl FnOnce(&mut User) -> T,
    ) -> Result<T, UserRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(UserRepositoryError::UserNotFound)?;
        Ok(f(user))
    }
}

#[async_trait]
impl UserQuery for InMemoryUsers {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserQueryError> {
        self.check_query()?;
        Ok(self.get(user_id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserQueryError> {
        self.check_query()?;
        Ok(self.by_username(username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserQueryError> {
        self.check_query()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<User>, UserQueryError> {
        self.check_query()?;
        let needle = search.map(|s| s.to_lowercase());
        let mut users: Vec<User> = self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| {
                needle
                    .as_ref()
                    .map_or(true, |n| u.username.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResult::new(items, page, total))
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create_user(&self, data: CreateUserData) -> Result<User, UserRepositoryError> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();

        if state.users.iter().any(|u| u.username == data.username) {
            return Err(UserRepositoryError::UsernameTaken);
        }
        if state.users.iter().any(|u| u.email == data.email) {
            return Err(UserRepositoryError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: data.username,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            bio: data.bio,
            role: data.role,
            is_staff: data.is_staff,
            confirmation_code: ConfirmationCode::NotIssued,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: UserId,
        data: UpdateUserData,
    ) -> Result<User, UserRepositoryError> {
        self.check_write()?;
        {
            let state = self.state.lock().unwrap();
            let others = state.users.iter().filter(|u| u.id != user_id);
            for other in others {
                if data.username.as_deref() == Some(other.username.as_str()) {
                    return Err(UserRepositoryError::UsernameTaken);
                }
                if data.email.as_deref() == Some(other.email.as_str()) {
                    return Err(UserRepositoryError::EmailTaken);
                }
            }
        }

        self.with_user(user_id, |user| {
            if let Some(v) = data.username {
                user.username = v;
            }
            if let Some(v) = data.email {
                user.email = v;
            }
            if let Some(v) = data.first_name {
                user.first_name = v;
            }
            if let Some(v) = data.last_name {
                user.last_name = v;
            }
            if let Some(v) = data.bio {
                user.bio = v;
            }
            if let Some(v) = data.role {
                user.role = v;
            }
            user.updated_at = Utc::now();
            user.clone()
        })
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepositoryError> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != user_id);
        if state.users.len() == before {
            return Err(UserRepositoryError::UserNotFound);
        }
        Ok(())
    }

    async fn issue_confirmation_code(
        &self,
        user_id: UserId,
        code_hash: String,
    ) -> Result<(), UserRepositoryError> {
        self.check_write()?;
        self.with_user(user_id, |user| {
            user.confirmation_code = ConfirmationCode::Pending(code_hash);
        })
    }

    async fn redeem_confirmation_code(
        &self,
        user_id: UserId,
        code_hash: &str,
    ) -> Result<bool, UserRepositoryError> {
        self.check_write()?;
        let redeemed = self.with_user(user_id, |user| match &user.confirmation_code {
            ConfirmationCode::Pending(stored) if stored == code_hash => {
                user.confirmation_code = ConfirmationCode::Consumed;
                true
            }
            _ => false,
        });
        // The conditional UPDATE in Postgres affects zero rows for unknown ids.
        Ok(redeemed.unwrap_or(false))
    }

    async fn invalidate_confirmation_code(
        &self,
        user_id: UserId,
    ) -> Result<(), UserRepositoryError> {
        self.check_write()?;
        self.with_user(user_id, |user| {
            user.confirmation_code = ConfirmationCode::Consumed;
        })
    }
}

use chrono::Utc;

use crate::auth::application::domain::entities::{ConfirmationCode, Role, User, UserId};
use crate::auth::application::domain::permissions::{Caller, Principal};

pub fn sample_user(username: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId::new(),
        username: username.to_string(),
        email: email.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        bio: String::new(),
        role: Role::User,
        is_staff: false,
        confirmation_code: ConfirmationCode::NotIssued,
        created_at: now,
        updated_at: now,
    }
}

pub fn user_with_role(username: &str, role: Role) -> User {
    let mut user = sample_user(username, &format!("{}@example.com", username));
    user.role = role;
    user
}

pub fn caller_for(user: &User) -> Caller {
    Caller::Authenticated(Principal::from(user))
}

pub fn caller_with_role(role: Role) -> Caller {
    caller_for(&user_with_role(&format!("{}-caller", role), role))
}

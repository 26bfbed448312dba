//! Validation shared by the admin and self-service user endpoints.

use crate::auth::application::domain::entities::{
    validate_name, Email, Role, UserId, Username,
};
use crate::auth::application::ports::outgoing::{
    CreateUserData, UpdateUserData, UserQuery, UserQueryError, UserRepositoryError,
};
use crate::auth::application::use_cases::request_signup::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, Default)]
pub struct NewUserInput {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatchInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

fn parse_role(errors: &mut FieldErrors, raw: Option<&str>) -> Option<Role> {
    raw.and_then(|r| errors.check("role", r.trim().parse::<Role>()))
}

pub fn validate_new_user(input: NewUserInput) -> Result<CreateUserData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = errors.check("username", Username::parse(&input.username));
    let email = errors.check("email", Email::parse(&input.email));
    let first_name = errors.check(
        "first_name",
        validate_name(input.first_name.as_deref().unwrap_or_default()),
    );
    let last_name = errors.check(
        "last_name",
        validate_name(input.last_name.as_deref().unwrap_or_default()),
    );
    let role = parse_role(&mut errors, input.role.as_deref());

    match (username, email, first_name, last_name) {
        (Some(username), Some(email), Some(first_name), Some(last_name)) if errors.is_empty() => {
            Ok(CreateUserData {
                username: username.into_inner(),
                email: email.into_inner(),
                first_name,
                last_name,
                bio: input.bio.unwrap_or_default(),
                role: role.unwrap_or_default(),
                is_staff: false,
            })
        }
        _ => Err(errors),
    }
}

/// `allow_role = false` drops any submitted role (self-service edits).
pub fn validate_patch(input: UserPatchInput, allow_role: bool) -> Result<UpdateUserData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = input
        .username
        .as_deref()
        .and_then(|v| errors.check("username", Username::parse(v)))
        .map(Username::into_inner);
    let email = input
        .email
        .as_deref()
        .and_then(|v| errors.check("email", Email::parse(v)))
        .map(Email::into_inner);
    let first_name = input
        .first_name
        .as_deref()
        .and_then(|v| errors.check("first_name", validate_name(v)));
    let last_name = input
        .last_name
        .as_deref()
        .and_then(|v| errors.check("last_name", validate_name(v)));
    let role = if allow_role {
        parse_role(&mut errors, input.role.as_deref())
    } else {
        None
    };

    errors.into_result()?;

    Ok(UpdateUserData {
        username,
        email,
        first_name,
        last_name,
        bio: input.bio,
        role,
    })
}

/// Field errors for username/email already used by another account.
pub async fn check_unique<Q: UserQuery + ?Sized>(
    query: &Q,
    exclude: Option<UserId>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<FieldErrors, UserQueryError> {
    let mut errors = FieldErrors::new();
    let is_other = |id: UserId| exclude != Some(id);

    if let Some(username) = username {
        if let Some(existing) = query.find_by_username(username).await? {
            if is_other(existing.id) {
                errors.add("username", USERNAME_TAKEN);
            }
        }
    }

    if let Some(email) = email {
        if let Some(existing) = query.find_by_email(email).await? {
            if is_other(existing.id) {
                errors.add("email", EMAIL_TAKEN);
            }
        }
    }

    Ok(errors)
}

/// Unique-constraint failures surfaced by storage, as field errors.
pub fn conflict_fields(err: &UserRepositoryError) -> Option<FieldErrors> {
    match err {
        UserRepositoryError::UsernameTaken => Some(FieldErrors::single("username", USERNAME_TAKEN)),
        UserRepositoryError::EmailTaken => Some(FieldErrors::single("email", EMAIL_TAKEN)),
        _ => None,
    }
}

use actix_web::{get, patch, web, HttpRequest, HttpResponse, Responder};
use tracing::{error, info, warn};

use super::user_dto::{PatchUserRequest, UserResponse};
use crate::auth::adapter::incoming::web::extractors::check_access;
use crate::auth::application::domain::permissions::{Authenticated, Caller};
use crate::auth::application::use_cases::profile::ProfileError;
use crate::shared::api::ApiResponse;
use crate::AppState;

fn map_profile_error(err: ProfileError, username: &str) -> HttpResponse {
    match err {
        ProfileError::Validation(fields) => {
            warn!(username = %username, fields = %fields, "Profile update rejected");
            ApiResponse::validation_error(fields)
        }
        ProfileError::NotFound => ApiResponse::not_found("USER_NOT_FOUND", "User not found"),
        ProfileError::RepositoryError(msg) => {
            error!(username = %username, error = %msg, "Profile operation failed");
            ApiResponse::internal_error()
        }
    }
}

#[get("/api/v1/users/me")]
pub async fn get_me_handler(
    req: HttpRequest,
    caller: Caller,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&Authenticated, &caller, &req) {
        return resp;
    }
    let Some(principal) = caller.principal() else {
        return ApiResponse::internal_error();
    };

    match data.profile_use_case.get(principal.user_id).await {
        Ok(user) => ApiResponse::success(UserResponse::from(user)),
        Err(e) => map_profile_error(e, &principal.username),
    }
}

/// Self-service edit; `role` in the body is ignored.
#[patch("/api/v1/users/me")]
pub async fn patch_me_handler(
    req: HttpRequest,
    caller: Caller,
    body: web::Json<PatchUserRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&Authenticated, &caller, &req) {
        return resp;
    }
    let Some(principal) = caller.principal() else {
        return ApiResponse::internal_error();
    };

    match data
        .profile_use_case
        .update(principal.user_id, body.into_inner().into())
        .await
    {
        Ok(user) => {
            info!(username = %user.username, "Profile updated");
            ApiResponse::success(UserResponse::from(user))
        }
        Err(e) => map_profile_error(e, &principal.username),
    }
}

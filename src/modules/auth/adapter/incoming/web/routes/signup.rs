use crate::api::schemas::{ErrorResponse, SuccessResponse};
use crate::auth::application::use_cases::request_signup::{SignupError, SignupInput};
use crate::shared::api::ApiResponse;
use crate::AppState;
use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Request body for signup
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Letters, digits and `@.+-_`; `me` is reserved
    #[schema(example = "johndoe")]
    #[serde(default)]
    pub username: String,

    /// Address the confirmation code is sent to
    #[schema(example = "john@example.com")]
    #[serde(default)]
    pub email: String,
}

/// Echo of the submitted identity. The code itself only travels by email.
#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    #[schema(example = "johndoe")]
    pub username: String,

    #[schema(example = "john@example.com")]
    pub email: String,
}

fn map_signup_error(err: SignupError, req: &SignupRequest) -> HttpResponse {
    match err {
        SignupError::Validation(fields) => {
            warn!(
                username = %req.username,
                email = %req.email,
                fields = %fields,
                "Signup rejected"
            );
            ApiResponse::validation_error(fields)
        }
        SignupError::RepositoryError(msg) => {
            error!(
                username = %req.username,
                error = %msg,
                "Signup failed"
            );
            ApiResponse::internal_error()
        }
    }
}

/// Sign up or request a new confirmation code
///
/// Creates the account on first use. Signing up again with the same
/// username and email issues a fresh code and invalidates the previous one.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (
            status = 200,
            description = "Confirmation code sent",
            body = inline(SuccessResponse<SignupResponse>),
            example = json!({
                "success": true,
                "data": {
                    "username": "johndoe",
                    "email": "john@example.com"
                }
            })
        ),
        (
            status = 400,
            description = "Validation error",
            body = ErrorResponse,
            example = json!({
                "success": false,
                "error": {
                    "code": "VALIDATION_ERROR",
                    "message": "Invalid input",
                    "fields": {
                        "username": ["A user with that username already exists"]
                    }
                }
            })
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse
        ),
    )
)]
#[post("/api/v1/auth/signup")]
pub async fn signup_handler(
    req: web::Json<SignupRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    info!(username = %req.username, "Signup attempt");

    let input = SignupInput {
        username: req.username.clone(),
        email: req.email.clone(),
    };

    match data.signup_orchestrator.signup(input).await {
        Ok(output) => ApiResponse::success(SignupResponse {
            username: output.username,
            email: output.email,
        }),
        Err(e) => map_signup_error(e, &req),
    }
}

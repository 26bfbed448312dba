use crate::api::schemas::{ErrorResponse, SuccessResponse};
use crate::auth::application::use_cases::obtain_token::{ObtainTokenError, ObtainTokenInput};
use crate::shared::api::ApiResponse;
use crate::AppState;
use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ObtainTokenRequest {
    #[schema(example = "johndoe")]
    #[serde(default)]
    pub username: String,

    /// Code received by email after signup
    #[schema(example = "K7Q2ZP4M")]
    #[serde(default)]
    pub confirmation_code: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

fn map_obtain_token_error(err: ObtainTokenError, username: &str) -> HttpResponse {
    match err {
        ObtainTokenError::Validation(fields) => {
            warn!(username = %username, fields = %fields, "Token request rejected");
            ApiResponse::validation_error(fields)
        }
        ObtainTokenError::UserNotFound => {
            warn!(username = %username, "Token requested for unknown user");
            ApiResponse::not_found("USER_NOT_FOUND", "User not found")
        }
        ObtainTokenError::InvalidConfirmationCode => {
            warn!(username = %username, "Invalid or reused confirmation code");
            ApiResponse::bad_request(
                "INVALID_CONFIRMATION_CODE",
                "Confirmation code is invalid or has already been used",
            )
        }
        other => {
            error!(username = %username, error = %other, "Token issuance failed");
            ApiResponse::internal_error()
        }
    }
}

/// Exchange a confirmation code for an access token
///
/// Each code works once. Any failed attempt also burns the pending code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    tag = "auth",
    request_body = ObtainTokenRequest,
    responses(
        (
            status = 200,
            description = "Token issued",
            body = inline(SuccessResponse<TokenResponse>),
            example = json!({
                "success": true,
                "data": { "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..." }
            })
        ),
        (
            status = 400,
            description = "Invalid input or confirmation code",
            body = ErrorResponse,
            example = json!({
                "success": false,
                "error": {
                    "code": "INVALID_CONFIRMATION_CODE",
                    "message": "Confirmation code is invalid or has already been used"
                }
            })
        ),
        (
            status = 404,
            description = "Unknown username",
            body = ErrorResponse
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse
        ),
    )
)]
#[post("/api/v1/auth/token")]
pub async fn obtain_token_handler(
    req: web::Json<ObtainTokenRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let req = req.into_inner();
    let username = req.username.clone();

    let result = data
        .obtain_token_use_case
        .execute(ObtainTokenInput {
            username: req.username,
            confirmation_code: req.confirmation_code,
        })
        .await;

    match result {
        Ok(output) => {
            info!(username = %username, "Access token issued");
            ApiResponse::success(TokenResponse {
                token: output.token,
            })
        }
        Err(e) => map_obtain_token_error(e, &username),
    }
}

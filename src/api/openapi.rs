use crate::api::schemas::{ErrorDetail, ErrorResponse, SuccessResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::auth::adapter::incoming::web::routes::{
    ObtainTokenRequest, SignupRequest, SignupResponse, TokenResponse, UserResponse,
};
use crate::catalog::adapter::incoming::web::routes::{TaxonomyResponse, TitleResponse};
use crate::review::adapter::incoming::web::routes::{
    CommentResponse, CreateReviewRequest, ReviewResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reviews API",
        version = "1.0.0",
        description = "Catalogue of titles with user reviews, ratings and comments",
        contact(
            name = "API Support",
            email = "support@example.com"
        )
    ),
    paths(
        // Auth
        crate::auth::adapter::incoming::web::routes::signup::signup_handler,
        crate::auth::adapter::incoming::web::routes::obtain_token::obtain_token_handler,

        // Reviews
        crate::review::adapter::incoming::web::routes::reviews::list_reviews_handler,
        crate::review::adapter::incoming::web::routes::reviews::create_review_handler,
    ),
    components(
        schemas(
            SuccessResponse<TokenResponse>,
            ErrorResponse,
            ErrorDetail,

            SignupRequest,
            SignupResponse,
            ObtainTokenRequest,
            TokenResponse,
            UserResponse,

            TaxonomyResponse,
            TitleResponse,

            CreateReviewRequest,
            ReviewResponse,
            CommentResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup and token exchange"),
        (name = "users", description = "User administration and profile"),
        (name = "catalog", description = "Categories, genres and titles"),
        (name = "reviews", description = "Reviews and comments"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/auth/token"))
                        .build(),
                ),
            )
        }
    }
}

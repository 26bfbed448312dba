use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use tracing::{error, warn};

use super::review_dto::{CreateReviewRequest, PatchReviewRequest, ReviewResponse};
use crate::api::schemas::{ErrorResponse, SuccessResponse};
use crate::auth::adapter::incoming::web::extractors::{access_denied_response, check_access};
use crate::auth::application::domain::permissions::{Caller, OwnerOrModeratorOrAdminOrReadOnly};
use crate::catalog::application::domain::entities::TitleId;
use crate::review::application::domain::entities::ReviewId;
use crate::review::application::ports::incoming::use_cases::{
    CreateReviewCommand, PatchReviewCommand, ReviewError,
};
use crate::shared::api::ApiResponse;
use crate::shared::pagination::{PageQuery, PageRequest, PageResult};
use crate::AppState;

fn map_review_error(err: ReviewError, title_id: TitleId) -> HttpResponse {
    match err {
        ReviewError::Validation(fields) => {
            warn!(title_id, fields = %fields, "Review rejected");
            ApiResponse::validation_error(fields)
        }
        ReviewError::TitleNotFound => ApiResponse::not_found("TITLE_NOT_FOUND", "Title not found"),
        ReviewError::ReviewNotFound => {
            ApiResponse::not_found("REVIEW_NOT_FOUND", "Review not found")
        }
        ReviewError::AlreadyReviewed => {
            ApiResponse::conflict("REVIEW_ALREADY_EXISTS", &err.to_string())
        }
        ReviewError::AccessDenied(denied) => access_denied_response(denied),
        ReviewError::RepositoryError(msg) => {
            error!(title_id, error = %msg, "Review operation failed");
            ApiResponse::internal_error()
        }
    }
}

/// Reviews of a title, newest first
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    tag = "reviews",
    params(
        ("title_id" = i32, Path, description = "Title id"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of reviews", body = inline(SuccessResponse<PageResult<ReviewResponse>>)),
        (status = 404, description = "Unknown title", body = ErrorResponse),
    )
)]
#[get("/api/v1/titles/{title_id}/reviews")]
pub async fn list_reviews_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<TitleId>,
    page: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let title_id = path.into_inner();
    match data
        .reviews
        .reviews
        .list(title_id, PageRequest::from(page.into_inner()))
        .await
    {
        Ok(page) => ApiResponse::success(page.map(ReviewResponse::from)),
        Err(e) => map_review_error(e, title_id),
    }
}

#[get("/api/v1/titles/{title_id}/reviews/{review_id}")]
pub async fn get_review_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId)>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id) = path.into_inner();
    match data.reviews.reviews.get(title_id, review_id).await {
        Ok(review) => ApiResponse::success(ReviewResponse::from(review)),
        Err(e) => map_review_error(e, title_id),
    }
}

/// Post a review
///
/// One review per user and title; a second one is rejected with 409.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    tag = "reviews",
    params(("title_id" = i32, Path, description = "Title id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = inline(SuccessResponse<ReviewResponse>)),
        (
            status = 400,
            description = "Validation error",
            body = ErrorResponse,
            example = json!({
                "success": false,
                "error": {
                    "code": "VALIDATION_ERROR",
                    "message": "Invalid input",
                    "fields": { "score": ["Score must be between 1 and 10"] }
                }
            })
        ),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Unknown title", body = ErrorResponse),
        (status = 409, description = "Already reviewed by this user", body = ErrorResponse),
    ),
    security(("BearerAuth" = []))
)]
#[post("/api/v1/titles/{title_id}/reviews")]
pub async fn create_review_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<TitleId>,
    body: web::Json<CreateReviewRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let title_id = path.into_inner();
    let body = body.into_inner();
    let command = match CreateReviewCommand::new(&body.text, body.score) {
        Ok(command) => command,
        Err(fields) => return map_review_error(ReviewError::Validation(fields), title_id),
    };

    match data.reviews.reviews.create(&caller, title_id, command).await {
        Ok(review) => ApiResponse::created(ReviewResponse::from(review)),
        Err(e) => map_review_error(e, title_id),
    }
}

#[patch("/api/v1/titles/{title_id}/reviews/{review_id}")]
pub async fn patch_review_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId)>,
    body: web::Json<PatchReviewRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id) = path.into_inner();
    let body = body.into_inner();
    let command = match PatchReviewCommand::new(body.text, body.score) {
        Ok(command) => command,
        Err(fields) => return map_review_error(ReviewError::Validation(fields), title_id),
    };

    match data
        .reviews
        .reviews
        .update(&caller, title_id, review_id, command)
        .await
    {
        Ok(review) => ApiResponse::success(ReviewResponse::from(review)),
        Err(e) => map_review_error(e, title_id),
    }
}

#[delete("/api/v1/titles/{title_id}/reviews/{review_id}")]
pub async fn delete_review_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId)>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id) = path.into_inner();
    match data.reviews.reviews.delete(&caller, title_id, review_id).await {
        Ok(()) => ApiResponse::no_content(),
        Err(e) => map_review_error(e, title_id),
    }
}

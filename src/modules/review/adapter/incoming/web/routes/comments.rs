use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use tracing::{error, warn};

use super::review_dto::{CommentRequest, CommentResponse, PatchCommentRequest};
use crate::auth::adapter::incoming::web::extractors::{access_denied_response, check_access};
use crate::auth::application::domain::permissions::{Caller, OwnerOrModeratorOrAdminOrReadOnly};
use crate::catalog::application::domain::entities::TitleId;
use crate::review::application::domain::entities::{CommentId, ReviewId};
use crate::review::application::ports::incoming::use_cases::{CommentCommand, CommentError};
use crate::shared::api::ApiResponse;
use crate::shared::pagination::{PageQuery, PageRequest};
use crate::AppState;

fn map_comment_error(err: CommentError, review_id: ReviewId) -> HttpResponse {
    match err {
        CommentError::Validation(fields) => {
            warn!(review_id, fields = %fields, "Comment rejected");
            ApiResponse::validation_error(fields)
        }
        CommentError::TitleNotFound => ApiResponse::not_found("TITLE_NOT_FOUND", "Title not found"),
        CommentError::ReviewNotFound => {
            ApiResponse::not_found("REVIEW_NOT_FOUND", "Review not found")
        }
        CommentError::CommentNotFound => {
            ApiResponse::not_found("COMMENT_NOT_FOUND", "Comment not found")
        }
        CommentError::AccessDenied(denied) => access_denied_response(denied),
        CommentError::RepositoryError(msg) => {
            error!(review_id, error = %msg, "Comment operation failed");
            ApiResponse::internal_error()
        }
    }
}

#[get("/api/v1/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn list_comments_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId)>,
    page: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id) = path.into_inner();
    match data
        .reviews
        .comments
        .list(title_id, review_id, PageRequest::from(page.into_inner()))
        .await
    {
        Ok(page) => ApiResponse::success(page.map(CommentResponse::from)),
        Err(e) => map_comment_error(e, review_id),
    }
}

#[get("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn get_comment_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId, CommentId)>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id, comment_id) = path.into_inner();
    match data.reviews.comments.get(title_id, review_id, comment_id).await {
        Ok(comment) => ApiResponse::success(CommentResponse::from(comment)),
        Err(e) => map_comment_error(e, review_id),
    }
}

#[post("/api/v1/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn create_comment_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId)>,
    body: web::Json<CommentRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id) = path.into_inner();
    let command = match CommentCommand::new(&body.text) {
        Ok(command) => command,
        Err(fields) => return map_comment_error(CommentError::Validation(fields), review_id),
    };

    match data
        .reviews
        .comments
        .create(&caller, title_id, review_id, command)
        .await
    {
        Ok(comment) => ApiResponse::created(CommentResponse::from(comment)),
        Err(e) => map_comment_error(e, review_id),
    }
}

#[patch("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn patch_comment_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId, CommentId)>,
    body: web::Json<PatchCommentRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id, comment_id) = path.into_inner();
    let command = match body.into_inner().text.as_deref().map(CommentCommand::new).transpose() {
        Ok(command) => command,
        Err(fields) => return map_comment_error(CommentError::Validation(fields), review_id),
    };

    match data
        .reviews
        .comments
        .update(&caller, title_id, review_id, comment_id, command)
        .await
    {
        Ok(comment) => ApiResponse::success(CommentResponse::from(comment)),
        Err(e) => map_comment_error(e, review_id),
    }
}

#[delete("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn delete_comment_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<(TitleId, ReviewId, CommentId)>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&OwnerOrModeratorOrAdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let (title_id, review_id, comment_id) = path.into_inner();
    match data
        .reviews
        .comments
        .delete(&caller, title_id, review_id, comment_id)
        .await
    {
        Ok(()) => ApiResponse::no_content(),
        Err(e) => map_comment_error(e, review_id),
    }
}

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use tracing::{error, warn};

use super::catalog_dto::{CreateTitleRequest, PatchTitleRequest, TitleListQuery, TitleResponse};
use crate::auth::adapter::incoming::web::extractors::check_access;
use crate::auth::application::domain::permissions::{AdminOrReadOnly, Caller};
use crate::catalog::application::domain::entities::TitleId;
use crate::catalog::application::ports::incoming::use_cases::{
    CreateTitleCommand, PatchTitleCommand, TitleError,
};
use crate::shared::api::ApiResponse;
use crate::shared::pagination::{PageQuery, PageRequest};
use crate::AppState;

fn map_title_error(err: TitleError, title_id: Option<TitleId>) -> HttpResponse {
    match err {
        TitleError::Validation(fields) => {
            warn!(title_id = ?title_id, fields = %fields, "Title change rejected");
            ApiResponse::validation_error(fields)
        }
        TitleError::NotFound => ApiResponse::not_found("TITLE_NOT_FOUND", "Title not found"),
        TitleError::RepositoryError(msg) => {
            error!(title_id = ?title_id, error = %msg, "Title operation failed");
            ApiResponse::internal_error()
        }
    }
}

#[get("/api/v1/titles")]
pub async fn list_titles_handler(
    req: HttpRequest,
    caller: Caller,
    query: web::Query<TitleListQuery>,
    page: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOrReadOnly, &caller, &req) {
        return resp;
    }

    match data
        .catalog
        .titles
        .list(query.into_inner().into(), PageRequest::from(page.into_inner()))
        .await
    {
        Ok(page) => ApiResponse::success(page.map(TitleResponse::from)),
        Err(e) => map_title_error(e, None),
    }
}

#[get("/api/v1/titles/{title_id}")]
pub async fn get_title_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<TitleId>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let title_id = path.into_inner();
    match data.catalog.titles.get(title_id).await {
        Ok(title) => ApiResponse::success(TitleResponse::from(title)),
        Err(e) => map_title_error(e, Some(title_id)),
    }
}

#[post("/api/v1/titles")]
pub async fn create_title_handler(
    req: HttpRequest,
    caller: Caller,
    body: web::Json<CreateTitleRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let command = match CreateTitleCommand::new(body.into_inner().into()) {
        Ok(command) => command,
        Err(fields) => return map_title_error(TitleError::Validation(fields), None),
    };

    match data.catalog.titles.create(command).await {
        Ok(title) => ApiResponse::created(TitleResponse::from(title)),
        Err(e) => map_title_error(e, None),
    }
}

#[patch("/api/v1/titles/{title_id}")]
pub async fn patch_title_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<TitleId>,
    body: web::Json<PatchTitleRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let title_id = path.into_inner();
    let command = match PatchTitleCommand::new(body.into_inner().into()) {
        Ok(command) => command,
        Err(fields) => return map_title_error(TitleError::Validation(fields), Some(title_id)),
    };

    match data.catalog.titles.update(title_id, command).await {
        Ok(title) => ApiResponse::success(TitleResponse::from(title)),
        Err(e) => map_title_error(e, Some(title_id)),
    }
}

#[delete("/api/v1/titles/{title_id}")]
pub async fn delete_title_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<TitleId>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOrReadOnly, &caller, &req) {
        return resp;
    }

    let title_id = path.into_inner();
    match data.catalog.titles.delete(title_id).await {
        Ok(()) => ApiResponse::no_content(),
        Err(e) => map_title_error(e, Some(title_id)),
    }
}

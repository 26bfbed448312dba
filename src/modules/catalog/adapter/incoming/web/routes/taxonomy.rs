use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use tracing::{error, warn};

use super::catalog_dto::{CreateTaxonomyRequest, SearchQuery, TaxonomyResponse};
use crate::auth::adapter::incoming::web::extractors::check_access;
use crate::auth::application::domain::permissions::{AdminOrReadOnly, Caller};
use crate::catalog::application::domain::entities::TaxonomyKind;
use crate::catalog::application::ports::incoming::use_cases::{
    CreateTaxonomyCommand, ManageTaxonomyUseCase, TaxonomyError,
};
use crate::shared::api::ApiResponse;
use crate::shared::pagination::{PageQuery, PageRequest};
use crate::AppState;

fn map_taxonomy_error(kind: TaxonomyKind, err: TaxonomyError) -> HttpResponse {
    match err {
        TaxonomyError::Validation(fields) => {
            warn!(kind = %kind, fields = %fields, "Taxonomy change rejected");
            ApiResponse::validation_error(fields)
        }
        TaxonomyError::NotFound => match kind {
            TaxonomyKind::Category => {
                ApiResponse::not_found("CATEGORY_NOT_FOUND", "Category not found")
            }
            TaxonomyKind::Genre => ApiResponse::not_found("GENRE_NOT_FOUND", "Genre not found"),
        },
        TaxonomyError::RepositoryError(msg) => {
            error!(kind = %kind, error = %msg, "Taxonomy operation failed");
            ApiResponse::internal_error()
        }
    }
}

async fn list_entries(
    use_case: &(dyn ManageTaxonomyUseCase + Send + Sync),
    req: &HttpRequest,
    caller: &Caller,
    search: Option<String>,
    page: PageQuery,
) -> HttpResponse {
    if let Err(resp) = check_access(&AdminOrReadOnly, caller, req) {
        return resp;
    }

    match use_case.list(search, PageRequest::from(page)).await {
        Ok(page) => ApiResponse::success(page.map(TaxonomyResponse::from)),
        Err(e) => map_taxonomy_error(use_case.kind(), e),
    }
}

async fn create_entry(
    use_case: &(dyn ManageTaxonomyUseCase + Send + Sync),
    req: &HttpRequest,
    caller: &Caller,
    body: CreateTaxonomyRequest,
) -> HttpResponse {
    if let Err(resp) = check_access(&AdminOrReadOnly, caller, req) {
        return resp;
    }

    let command = match CreateTaxonomyCommand::new(&body.name, &body.slug) {
        Ok(command) => command,
        Err(fields) => return map_taxonomy_error(use_case.kind(), TaxonomyError::Validation(fields)),
    };

    match use_case.create(command).await {
        Ok(entry) => ApiResponse::created(TaxonomyResponse::from(entry)),
        Err(e) => map_taxonomy_error(use_case.kind(), e),
    }
}

async fn delete_entry(
    use_case: &(dyn ManageTaxonomyUseCase + Send + Sync),
    req: &HttpRequest,
    caller: &Caller,
    slug: &str,
) -> HttpResponse {
    if let Err(resp) = check_access(&AdminOrReadOnly, caller, req) {
        return resp;
    }

    match use_case.delete(slug).await {
        Ok(()) => ApiResponse::no_content(),
        Err(e) => map_taxonomy_error(use_case.kind(), e),
    }
}

// ──── categories ────

#[get("/api/v1/categories")]
pub async fn list_categories_handler(
    req: HttpRequest,
    caller: Caller,
    query: web::Query<SearchQuery>,
    page: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    list_entries(
        data.catalog.categories.as_ref(),
        &req,
        &caller,
        query.into_inner().search,
        page.into_inner(),
    )
    .await
}

#[post("/api/v1/categories")]
pub async fn create_category_handler(
    req: HttpRequest,
    caller: Caller,
    body: web::Json<CreateTaxonomyRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    create_entry(data.catalog.categories.as_ref(), &req, &caller, body.into_inner()).await
}

#[delete("/api/v1/categories/{slug}")]
pub async fn delete_category_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    delete_entry(data.catalog.categories.as_ref(), &req, &caller, &path.into_inner()).await
}

// ──── genres ────

#[get("/api/v1/genres")]
pub async fn list_genres_handler(
    req: HttpRequest,
    caller: Caller,
    query: web::Query<SearchQuery>,
    page: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    list_entries(
        data.catalog.genres.as_ref(),
        &req,
        &caller,
        query.into_inner().search,
        page.into_inner(),
    )
    .await
}

#[post("/api/v1/genres")]
pub async fn create_genre_handler(
    req: HttpRequest,
    caller: Caller,
    body: web::Json<CreateTaxonomyRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    create_entry(data.catalog.genres.as_ref(), &req, &caller, body.into_inner()).await
}

#[delete("/api/v1/genres/{slug}")]
pub async fn delete_genre_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    delete_entry(data.catalog.genres.as_ref(), &req, &caller, &path.into_inner()).await
}

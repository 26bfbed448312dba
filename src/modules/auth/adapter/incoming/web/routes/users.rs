use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::user_dto::{CreateUserRequest, PatchUserRequest, UserResponse};
use crate::auth::adapter::incoming::web::extractors::check_access;
use crate::auth::application::domain::permissions::{AdminOnly, Caller};
use crate::auth::application::use_cases::manage_users::UserAdminError;
use crate::shared::api::ApiResponse;
use crate::shared::pagination::{PageQuery, PageRequest};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
}

fn map_user_admin_error(err: UserAdminError, target: &str) -> HttpResponse {
    match err {
        UserAdminError::Validation(fields) => {
            warn!(target_user = %target, fields = %fields, "User change rejected");
            ApiResponse::validation_error(fields)
        }
        UserAdminError::NotFound => ApiResponse::not_found("USER_NOT_FOUND", "User not found"),
        UserAdminError::RepositoryError(msg) => {
            error!(target_user = %target, error = %msg, "User administration failed");
            ApiResponse::internal_error()
        }
    }
}

#[get("/api/v1/users")]
pub async fn list_users_handler(
    req: HttpRequest,
    caller: Caller,
    query: web::Query<ListUsersQuery>,
    page: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOnly, &caller, &req) {
        return resp;
    }

    match data
        .user_admin_use_case
        .list(query.into_inner().search, PageRequest::from(page.into_inner()))
        .await
    {
        Ok(page) => ApiResponse::success(page.map(UserResponse::from)),
        Err(e) => map_user_admin_error(e, "*"),
    }
}

#[post("/api/v1/users")]
pub async fn create_user_handler(
    req: HttpRequest,
    caller: Caller,
    body: web::Json<CreateUserRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOnly, &caller, &req) {
        return resp;
    }

    let body = body.into_inner();
    let username = body.username.clone();

    match data.user_admin_use_case.create(body.into()).await {
        Ok(user) => {
            info!(username = %user.username, role = %user.role, "User created by admin");
            ApiResponse::created(UserResponse::from(user))
        }
        Err(e) => map_user_admin_error(e, &username),
    }
}

#[get("/api/v1/users/{username}")]
pub async fn get_user_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOnly, &caller, &req) {
        return resp;
    }

    let username = path.into_inner();
    match data.user_admin_use_case.get(&username).await {
        Ok(user) => ApiResponse::success(UserResponse::from(user)),
        Err(e) => map_user_admin_error(e, &username),
    }
}

#[patch("/api/v1/users/{username}")]
pub async fn patch_user_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<PatchUserRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOnly, &caller, &req) {
        return resp;
    }

    let username = path.into_inner();
    match data
        .user_admin_use_case
        .update(&username, body.into_inner().into())
        .await
    {
        Ok(user) => {
            info!(username = %user.username, role = %user.role, "User updated by admin");
            ApiResponse::success(UserResponse::from(user))
        }
        Err(e) => map_user_admin_error(e, &username),
    }
}

#[delete("/api/v1/users/{username}")]
pub async fn delete_user_handler(
    req: HttpRequest,
    caller: Caller,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = check_access(&AdminOnly, &caller, &req) {
        return resp;
    }

    let username = path.into_inner();
    match data.user_admin_use_case.delete(&username).await {
        Ok(()) => {
            info!(username = %username, "User deleted by admin");
            ApiResponse::no_content()
        }
        Err(e) => map_user_admin_error(e, &username),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::application::domain::entities::Role;
    use crate::auth::application::ports::outgoing::token_provider::TokenProvider;
    use crate::tests::support::app_state_builder::TestAppStateBuilder;
    use crate::tests::support::fixtures::{sample_user, user_with_role};
    use crate::tests::support::in_memory_users::InMemoryUsers;
    use crate::tests::support::stubs::StubTokenProvider;
    use actix_web::{dev::ServiceResponse, test, App};
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn send(
        users: &InMemoryUsers,
        as_user: Option<Uuid>,
        req: test::TestRequest,
    ) -> ServiceResponse {
        let state = TestAppStateBuilder::default().with_users(users.clone()).build();
        let token_provider: Arc<dyn TokenProvider + Send + Sync> =
            Arc::new(StubTokenProvider::new(as_user.unwrap_or_else(Uuid::nil)));

        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(web::Data::new(token_provider))
                .service(list_users_handler)
                .service(create_user_handler)
                .service(get_user_handler)
                .service(patch_user_handler)
                .service(delete_user_handler),
        )
        .await;

        let req = match as_user {
            Some(_) => req.insert_header(("Authorization", "Bearer token")),
            None => req,
        };
        test::call_service(&app, req.to_request()).await
    }

    fn admin_and_alice() -> (InMemoryUsers, Uuid) {
        let admin = user_with_role("root", Role::Admin);
        let users = InMemoryUsers::with_users(vec![admin.clone(), sample_user("alice", "a@x.com")]);
        (users, admin.id.value())
    }

    #[actix_web::test]
    async fn admin_lists_users() {
        let (users, admin) = admin_and_alice();

        let resp = send(
            &users,
            Some(admin),
            test::TestRequest::get().uri("/api/v1/users?search=ali"),
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["username"], "alice");
        assert_eq!(body["data"]["items"][0]["role"], "user");
    }

    #[actix_web::test]
    async fn regular_user_is_forbidden() {
        let (users, _) = admin_and_alice();
        let alice = users.by_username("alice").unwrap().id.value();

        let resp = send(&users, Some(alice), test::TestRequest::get().uri("/api/v1/users")).await;

        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn anonymous_is_unauthorized() {
        let (users, _) = admin_and_alice();

        let resp = send(&users, None, test::TestRequest::get().uri("/api/v1/users/alice")).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn admin_creates_user_with_role() {
        let (users, admin) = admin_and_alice();

        let resp = send(
            &users,
            Some(admin),
            test::TestRequest::post().uri("/api/v1/users").set_json(json!({
                "username": "mod",
                "email": "mod@x.com",
                "role": "moderator"
            })),
        )
        .await;

        assert_eq!(resp.status(), 201);
        assert_eq!(users.by_username("mod").unwrap().role, Role::Moderator);
    }

    #[actix_web::test]
    async fn invalid_role_is_field_error() {
        let (users, admin) = admin_and_alice();

        let resp = send(
            &users,
            Some(admin),
            test::TestRequest::patch()
                .uri("/api/v1/users/alice")
                .set_json(json!({ "role": "overlord" })),
        )
        .await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"]["fields"]["role"].is_array());
    }

    #[actix_web::test]
    async fn admin_promotes_user() {
        let (users, admin) = admin_and_alice();

        let resp = send(
            &users,
            Some(admin),
            test::TestRequest::patch()
                .uri("/api/v1/users/alice")
                .set_json(json!({ "role": "admin" })),
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["role"], "admin");
    }

    #[actix_web::test]
    async fn admin_deletes_user() {
        let (users, admin) = admin_and_alice();

        let resp = send(
            &users,
            Some(admin),
            test::TestRequest::delete().uri("/api/v1/users/alice"),
        )
        .await;

        assert_eq!(resp.status(), 204);
        assert!(users.by_username("alice").is_none());
    }

    #[actix_web::test]
    async fn unknown_username_is_404() {
        let (users, admin) = admin_and_alice();

        let resp = send(
            &users,
            Some(admin),
            test::TestRequest::get().uri("/api/v1/users/ghost"),
        )
        .await;

        assert_eq!(resp.status(), 404);
    }
}

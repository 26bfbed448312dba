use actix_web::{
    dev::Payload, http::Method, web, Error as ActixError, FromRequest, HttpRequest, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture};
use std::sync::Arc;

use crate::auth::application::domain::entities::UserId;
use crate::auth::application::domain::permissions::{
    authorize, AccessDenied, Caller, Permission, RequestMethod,
};
use crate::auth::application::helpers::ResolveCallerError;
use crate::auth::application::ports::outgoing::token_provider::TokenProvider;
use crate::{shared::api::ApiResponse, AppState};

fn create_api_error(response: HttpResponse) -> ActixError {
    actix_web::error::InternalError::from_response("", response).into()
}

fn invalid_token() -> ActixError {
    create_api_error(ApiResponse::unauthorized(
        "INVALID_TOKEN",
        "Invalid or expired token",
    ))
}

/// `None` when no Authorization header was sent at all.
fn extract_bearer_token(req: &HttpRequest) -> Result<Option<String>, ActixError> {
    let Some(header) = req.headers().get("Authorization") else {
        return Ok(None);
    };

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(invalid_token)
}

/// Anonymous without a header; otherwise the token must verify and its
/// subject must still exist.
impl FromRequest for Caller {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match extract_bearer_token(req) {
            Ok(Some(token)) => token,
            Ok(None) => return Box::pin(ready(Ok(Caller::Anonymous))),
            Err(e) => {
                tracing::warn!("Rejected malformed Authorization header");
                return Box::pin(ready(Err(e)));
            }
        };

        let token_provider = req
            .app_data::<web::Data<Arc<dyn TokenProvider + Send + Sync>>>()
            .cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        let (Some(token_provider), Some(state)) = (token_provider, state) else {
            tracing::error!("Token provider or application state not registered");
            return Box::pin(ready(Err(create_api_error(ApiResponse::internal_error()))));
        };

        Box::pin(async move {
            let claims = token_provider.verify_access_token(&token).map_err(|e| {
                tracing::warn!(error = %e, "Access token rejected");
                invalid_token()
            })?;

            match state.caller_resolver.resolve(UserId::from(claims.sub)).await {
                Ok(principal) => Ok(Caller::Authenticated(principal)),
                Err(ResolveCallerError::NotFound) => {
                    tracing::warn!(user_id = %claims.sub, "Token subject no longer exists");
                    Err(invalid_token())
                }
                Err(ResolveCallerError::RepositoryError(msg)) => {
                    tracing::error!(user_id = %claims.sub, error = %msg, "Failed to load caller");
                    Err(create_api_error(ApiResponse::internal_error()))
                }
            }
        })
    }
}

impl From<&Method> for RequestMethod {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => RequestMethod::Get,
            Method::HEAD => RequestMethod::Head,
            Method::OPTIONS => RequestMethod::Options,
            Method::PUT => RequestMethod::Put,
            Method::PATCH => RequestMethod::Patch,
            Method::DELETE => RequestMethod::Delete,
            // Anything else is handled like a write.
            _ => RequestMethod::Post,
        }
    }
}

pub fn access_denied_response(denied: AccessDenied) -> HttpResponse {
    match denied {
        AccessDenied::NotAuthenticated => {
            ApiResponse::unauthorized("NOT_AUTHENTICATED", &denied.to_string())
        }
        AccessDenied::Forbidden => ApiResponse::forbidden("FORBIDDEN", &denied.to_string()),
    }
}

/// Endpoint-level check for handlers.
pub fn check_access<P: Permission>(
    permission: &P,
    caller: &Caller,
    req: &HttpRequest,
) -> Result<(), HttpResponse> {
    authorize(permission, caller, RequestMethod::from(req.method())).map_err(|denied| {
        tracing::warn!(
            method = %req.method(),
            path = %req.path(),
            authenticated = caller.is_authenticated(),
            "Permission denied"
        );
        access_denied_response(denied)
    })
}

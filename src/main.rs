pub mod api;
pub mod config;
pub mod health;
pub mod modules;
pub mod shared;
pub use modules::auth;
pub use modules::catalog;
pub use modules::email;
pub use modules::review;

use crate::api::openapi::ApiDoc;
use crate::auth::adapter::outgoing::jwt::JwtTokenService;
use crate::auth::adapter::outgoing::random_code_generator::RandomCodeGenerator;
use crate::auth::adapter::outgoing::user_query_postgres::UserQueryPostgres;
use crate::auth::adapter::outgoing::user_repository_postgres::UserRepositoryPostgres;
use crate::auth::application::helpers::CallerResolver;
use crate::auth::application::orchestrator::user_signup::UserSignupOrchestrator;
use crate::auth::application::ports::outgoing::token_provider::TokenProvider;
use crate::auth::application::use_cases::{
    bootstrap_admin::BootstrapAdminUseCase,
    manage_users::{IUserAdminUseCase, UserAdminUseCase},
    obtain_token::{IObtainTokenUseCase, ObtainTokenUseCase},
    profile::{IProfileUseCase, ProfileUseCase},
    request_signup::RequestSignupUseCase,
};
use crate::catalog::adapter::outgoing::{
    TaxonomyRepositoryPostgres, TitleQueryPostgres, TitleRepositoryPostgres,
};
use crate::catalog::application::domain::entities::TaxonomyKind;
use crate::catalog::application::services::{TaxonomyService, TitleService};
use crate::catalog::application::CatalogUseCases;
use crate::config::{AppConfig, EmailConfig};
use crate::email::adapter::outgoing::log_sender::LogEmailSender;
use crate::email::adapter::outgoing::smtp_sender::SmtpEmailSender;
use crate::email::application::ports::outgoing::email_sender::EmailSender;
use crate::email::application::services::ConfirmationEmailService;
use crate::review::adapter::outgoing::{CommentRepositoryPostgres, ReviewRepositoryPostgres};
use crate::review::application::services::{CommentService, ReviewService};
use crate::review::application::ReviewUseCases;
use crate::shared::api::{custom_json_config, custom_query_config};

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub caller_resolver: CallerResolver,
    pub signup_orchestrator: Arc<UserSignupOrchestrator>,
    pub obtain_token_use_case: Arc<dyn IObtainTokenUseCase + Send + Sync>,
    pub profile_use_case: Arc<dyn IProfileUseCase + Send + Sync>,
    pub user_admin_use_case: Arc<dyn IUserAdminUseCase + Send + Sync>,
    pub catalog: CatalogUseCases,
    pub reviews: ReviewUseCases,
}

#[cfg(not(tarpaulin_include))]
fn email_sender(config: &EmailConfig) -> anyhow::Result<Arc<dyn EmailSender + Send + Sync>> {
    let sender: Arc<dyn EmailSender + Send + Sync> = match config {
        EmailConfig::Log => {
            warn!("EMAIL_BACKEND=log: confirmation emails are not delivered");
            Arc::new(LogEmailSender::new())
        }
        EmailConfig::Smtp {
            server,
            username,
            password,
            from,
        } => Arc::new(
            SmtpEmailSender::new(server, username, password, from)
                .map_err(anyhow::Error::msg)?,
        ),
        EmailConfig::LocalSmtp { host, port, from } => {
            Arc::new(SmtpEmailSender::new_local(host, *port, from))
        }
    };
    Ok(sender)
}

#[cfg(not(tarpaulin_include))]
fn build_state(
    db: &Arc<DatabaseConnection>,
    config: &AppConfig,
    jwt: &JwtTokenService,
) -> anyhow::Result<AppState> {
    let user_query = UserQueryPostgres::new(Arc::clone(db));
    let user_repo = UserRepositoryPostgres::new(Arc::clone(db));

    let signup_use_case = RequestSignupUseCase::new(
        user_query.clone(),
        user_repo.clone(),
        Arc::new(RandomCodeGenerator::new(config.confirmation_code_length)),
    );
    let notifier = ConfirmationEmailService::new(email_sender(&config.email)?);
    let signup_orchestrator =
        UserSignupOrchestrator::new(Arc::new(signup_use_case), Arc::new(notifier));

    let obtain_token_use_case =
        ObtainTokenUseCase::new(user_query.clone(), user_repo.clone(), Arc::new(jwt.clone()));

    let categories = TaxonomyRepositoryPostgres::new(Arc::clone(db), TaxonomyKind::Category);
    let genres = TaxonomyRepositoryPostgres::new(Arc::clone(db), TaxonomyKind::Genre);
    let title_query = TitleQueryPostgres::new(Arc::clone(db));
    let title_repo = TitleRepositoryPostgres::new(Arc::clone(db));
    let review_repo = ReviewRepositoryPostgres::new(Arc::clone(db));
    let comment_repo = CommentRepositoryPostgres::new(Arc::clone(db));

    let catalog = CatalogUseCases {
        categories: Arc::new(TaxonomyService::new(categories.clone())),
        genres: Arc::new(TaxonomyService::new(genres.clone())),
        titles: Arc::new(TitleService::new(
            title_query.clone(),
            title_repo,
            categories,
            genres,
        )),
    };

    let reviews = ReviewUseCases {
        reviews: Arc::new(ReviewService::new(title_query.clone(), review_repo.clone())),
        comments: Arc::new(CommentService::new(title_query, review_repo, comment_repo)),
    };

    Ok(AppState {
        caller_resolver: CallerResolver::new(Arc::new(user_query.clone())),
        signup_orchestrator: Arc::new(signup_orchestrator),
        obtain_token_use_case: Arc::new(obtain_token_use_case),
        profile_use_case: Arc::new(ProfileUseCase::new(user_query.clone(), user_repo.clone())),
        user_admin_use_case: Arc::new(UserAdminUseCase::new(user_query, user_repo)),
        catalog,
        reviews,
    })
}

#[actix_web::main]
#[cfg(not(tarpaulin_include))]
async fn start() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting application...");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let server_url = config.server_url();

    // Database connection
    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(50)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(false);

    let conn = Database::connect(opt)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;
        info!("Migrations applied");
    }

    let db_arc = Arc::new(conn);

    if let Some(admin) = &config.bootstrap_admin {
        let bootstrap = BootstrapAdminUseCase::new(
            UserQueryPostgres::new(Arc::clone(&db_arc)),
            UserRepositoryPostgres::new(Arc::clone(&db_arc)),
        );
        let outcome = bootstrap
            .execute(&admin.username, &admin.email)
            .await
            .context("Failed to bootstrap administrator")?;
        info!(username = %admin.username, outcome = ?outcome, "Bootstrap administrator checked");
    }

    let jwt_service = JwtTokenService::new(config.jwt.clone());
    let state = build_state(&db_arc, &config, &jwt_service)?;
    let token_provider_arc: Arc<dyn TokenProvider + Send + Sync> = Arc::new(jwt_service);
    let openapi = ApiDoc::openapi();

    info!(environment = %config.environment, "Server run on: {}", server_url);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(Arc::clone(&token_provider_arc)))
            .app_data(web::Data::new(Arc::clone(&db_arc)))
            .app_data(custom_json_config())
            .app_data(custom_query_config())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(init_routes)
    })
    .bind(&server_url)
    .with_context(|| format!("Failed to bind {}", server_url))?
    .run()
    .await?;

    Ok(())
}

#[cfg(not(tarpaulin_include))]
fn init_routes(cfg: &mut web::ServiceConfig) {
    use crate::auth::adapter::incoming::web::routes as auth_routes;
    use crate::catalog::adapter::incoming::web::routes as catalog_routes;
    use crate::review::adapter::incoming::web::routes as review_routes;

    // Health
    cfg.service(crate::health::health);
    cfg.service(crate::health::readiness);
    // Auth
    cfg.service(auth_routes::signup_handler);
    cfg.service(auth_routes::obtain_token_handler);
    // Users; `me` must be registered before `{username}`
    cfg.service(auth_routes::get_me_handler);
    cfg.service(auth_routes::patch_me_handler);
    cfg.service(auth_routes::list_users_handler);
    cfg.service(auth_routes::create_user_handler);
    cfg.service(auth_routes::get_user_handler);
    cfg.service(auth_routes::patch_user_handler);
    cfg.service(auth_routes::delete_user_handler);
    // Catalog
    cfg.service(catalog_routes::list_categories_handler);
    cfg.service(catalog_routes::create_category_handler);
    cfg.service(catalog_routes::delete_category_handler);
    cfg.service(catalog_routes::list_genres_handler);
    cfg.service(catalog_routes::create_genre_handler);
    cfg.service(catalog_routes::delete_genre_handler);
    cfg.service(catalog_routes::list_titles_handler);
    cfg.service(catalog_routes::create_title_handler);
    cfg.service(catalog_routes::get_title_handler);
    cfg.service(catalog_routes::patch_title_handler);
    cfg.service(catalog_routes::delete_title_handler);
    // Reviews and comments
    cfg.service(review_routes::list_reviews_handler);
    cfg.service(review_routes::create_review_handler);
    cfg.service(review_routes::get_review_handler);
    cfg.service(review_routes::patch_review_handler);
    cfg.service(review_routes::delete_review_handler);
    cfg.service(review_routes::list_comments_handler);
    cfg.service(review_routes::create_comment_handler);
    cfg.service(review_routes::get_comment_handler);
    cfg.service(review_routes::patch_comment_handler);
    cfg.service(review_routes::delete_comment_handler);
}

#[cfg(not(tarpaulin_include))]
fn main() {
    if let Err(e) = start() {
        eprintln!("Error starting app: {e:#}");
    }
}

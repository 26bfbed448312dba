use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;

use crate::auth::application::helpers::CallerResolver;
use crate::auth::application::orchestrator::user_signup::UserSignupOrchestrator;
use crate::auth::application::use_cases::manage_users::UserAdminUseCase;
use crate::auth::application::use_cases::obtain_token::ObtainTokenUseCase;
use crate::auth::application::use_cases::profile::ProfileUseCase;
use crate::auth::application::use_cases::request_signup::RequestSignupUseCase;
use crate::catalog::application::domain::entities::TaxonomyKind;
use crate::catalog::application::services::{TaxonomyService, TitleService};
use crate::catalog::application::CatalogUseCases;
use crate::email::application::ports::outgoing::confirmation_code_notifier::ConfirmationCodeNotifier;
use crate::review::application::services::{CommentService, ReviewService};
use crate::review::application::ReviewUseCases;
use crate::tests::support::in_memory_content::InMemoryContent;
use crate::tests::support::in_memory_users::InMemoryUsers;
use crate::tests::support::stubs::{RecordingNotifier, SequenceCodeGenerator, StubTokenProvider};
use crate::AppState;

/// Wires the real use cases over in-memory stores. Handlers under test
/// exercise the same application code as production.
pub struct TestAppStateBuilder {
    users: InMemoryUsers,
    content: Option<InMemoryContent>,
    notifier: Arc<dyn ConfirmationCodeNotifier + Send + Sync>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self {
            users: InMemoryUsers::new(),
            content: None,
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }
}

impl TestAppStateBuilder {
    pub fn with_users(mut self, users: InMemoryUsers) -> Self {
        self.users = users;
        self
    }

    /// Content must share the user store passed to [`Self::with_users`]
    /// for author names to resolve.
    pub fn with_content(mut self, content: InMemoryContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_notifier(
        mut self,
        notifier: impl ConfirmationCodeNotifier + Send + Sync + 'static,
    ) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn build(self) -> web::Data<AppState> {
        let users = self.users;
        let content = self
            .content
            .unwrap_or_else(|| InMemoryContent::with_users(users.clone()));

        let signup_use_case = RequestSignupUseCase::new(
            users.clone(),
            users.clone(),
            Arc::new(SequenceCodeGenerator::new()),
        );
        let obtain_token_use_case = ObtainTokenUseCase::new(
            users.clone(),
            users.clone(),
            Arc::new(StubTokenProvider::new(Uuid::nil())),
        );

        let catalog = CatalogUseCases {
            categories: Arc::new(TaxonomyService::new(content.taxonomy(TaxonomyKind::Category))),
            genres: Arc::new(TaxonomyService::new(content.taxonomy(TaxonomyKind::Genre))),
            titles: Arc::new(TitleService::new(
                content.clone(),
                content.clone(),
                content.taxonomy(TaxonomyKind::Category),
                content.taxonomy(TaxonomyKind::Genre),
            )),
        };

        let reviews = ReviewUseCases {
            reviews: Arc::new(ReviewService::new(content.clone(), content.clone())),
            comments: Arc::new(CommentService::new(
                content.clone(),
                content.clone(),
                content.clone(),
            )),
        };

        web::Data::new(AppState {
            caller_resolver: CallerResolver::new(Arc::new(users.clone())),
            signup_orchestrator: Arc::new(UserSignupOrchestrator::new(
                Arc::new(signup_use_case),
                self.notifier,
            )),
            obtain_token_use_case: Arc::new(obtain_token_use_case),
            profile_use_case: Arc::new(ProfileUseCase::new(users.clone(), users.clone())),
            user_admin_use_case: Arc::new(UserAdminUseCase::new(users.clone(), users)),
            catalog,
            reviews,
        })
    }
}

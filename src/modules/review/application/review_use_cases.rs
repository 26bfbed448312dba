use std::sync::Arc;

use crate::review::application::ports::incoming::use_cases::{
    ManageCommentsUseCase, ManageReviewsUseCase,
};

#[derive(Clone)]
pub struct ReviewUseCases {
    pub reviews: Arc<dyn ManageReviewsUseCase + Send + Sync>,
    pub comments: Arc<dyn ManageCommentsUseCase + Send + Sync>,
}

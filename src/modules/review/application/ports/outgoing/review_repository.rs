use async_trait::async_trait;

use crate::auth::application::domain::entities::UserId;
use crate::catalog::application::domain::entities::TitleId;
use crate::review::application::domain::entities::{Review, ReviewId};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone, PartialEq)]
pub struct NewReviewData {
    pub title_id: TitleId,
    pub author_id: UserId,
    pub text: String,
    pub score: i16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<i16>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReviewRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Raised by the `(author_id, title_id)` unique constraint.
    #[error("Author already reviewed this title")]
    AlreadyReviewed,

    #[error("Review not found")]
    NotFound,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Newest first.
    async fn list_for_title(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<PageResult<Review>, ReviewRepositoryError>;

    /// `None` when the review does not exist or belongs to another title.
    async fn find(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    async fn exists_for_author(
        &self,
        title_id: TitleId,
        author_id: UserId,
    ) -> Result<bool, ReviewRepositoryError>;

    async fn create(&self, data: NewReviewData) -> Result<Review, ReviewRepositoryError>;

    async fn update(
        &self,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review, ReviewRepositoryError>;

    async fn delete(&self, review_id: ReviewId) -> Result<(), ReviewRepositoryError>;
}

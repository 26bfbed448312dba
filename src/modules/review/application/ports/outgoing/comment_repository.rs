use async_trait::async_trait;

use crate::auth::application::domain::entities::UserId;
use crate::review::application::domain::entities::{Comment, CommentId, ReviewId};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone, PartialEq)]
pub struct NewCommentData {
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CommentRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Comment not found")]
    NotFound,
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Newest first.
    async fn list_for_review(
        &self,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<PageResult<Comment>, CommentRepositoryError>;

    /// `None` when the comment does not exist or belongs to another review.
    async fn find(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError>;

    async fn create(&self, data: NewCommentData) -> Result<Comment, CommentRepositoryError>;

    async fn update(
        &self,
        comment_id: CommentId,
        text: String,
    ) -> Result<Comment, CommentRepositoryError>;

    async fn delete(&self, comment_id: CommentId) -> Result<(), CommentRepositoryError>;
}

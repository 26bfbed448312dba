use async_trait::async_trait;

use crate::auth::application::domain::permissions::{AccessDenied, Caller};
use crate::catalog::application::domain::entities::TitleId;
use crate::catalog::application::ports::outgoing::TitleQueryError;
use crate::review::application::domain::entities::{
    validate_text, Comment, CommentId, ReviewId,
};
use crate::review::application::ports::outgoing::{CommentRepositoryError, ReviewRepositoryError};
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCommand {
    text: String,
}

impl CommentCommand {
    pub fn new(text: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        match errors.check("text", validate_text(text)) {
            Some(text) => Ok(Self { text }),
            None => Err(errors),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CommentError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Title not found")]
    TitleNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("{0}")]
    AccessDenied(AccessDenied),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<CommentRepositoryError> for CommentError {
    fn from(err: CommentRepositoryError) -> Self {
        match err {
            CommentRepositoryError::NotFound => CommentError::CommentNotFound,
            CommentRepositoryError::DatabaseError(msg) => CommentError::RepositoryError(msg),
        }
    }
}

impl From<ReviewRepositoryError> for CommentError {
    fn from(err: ReviewRepositoryError) -> Self {
        match err {
            ReviewRepositoryError::NotFound => CommentError::ReviewNotFound,
            other => CommentError::RepositoryError(other.to_string()),
        }
    }
}

impl From<TitleQueryError> for CommentError {
    fn from(err: TitleQueryError) -> Self {
        CommentError::RepositoryError(err.to_string())
    }
}

impl From<AccessDenied> for CommentError {
    fn from(err: AccessDenied) -> Self {
        CommentError::AccessDenied(err)
    }
}

/// Comments nested under a review, which must belong to the title in the path.
#[async_trait]
pub trait ManageCommentsUseCase: Send + Sync {
    async fn list(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<PageResult<Comment>, CommentError>;

    async fn get(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Comment, CommentError>;

    async fn create(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        command: CommentCommand,
    ) -> Result<Comment, CommentError>;

    /// `None` leaves the text unchanged.
    async fn update(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
        command: Option<CommentCommand>,
    ) -> Result<Comment, CommentError>;

    async fn delete(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<(), CommentError>;
}

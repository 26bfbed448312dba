use async_trait::async_trait;

use crate::auth::application::domain::permissions::{AccessDenied, Caller};
use crate::catalog::application::domain::entities::TitleId;
use crate::catalog::application::ports::outgoing::TitleQueryError;
use crate::review::application::domain::entities::{validate_text, Review, ReviewId, Score};
use crate::review::application::ports::outgoing::ReviewRepositoryError;
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::validation::FieldErrors;

const SCORE_REQUIRED: &str = "Score is required";

//
// ──────────────────────────────────────────────────────────
// Commands
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewCommand {
    text: String,
    score: Score,
}

impl CreateReviewCommand {
    pub fn new(text: &str, score: Option<i32>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = errors.check("text", validate_text(text));
        let score = match score {
            Some(raw) => errors.check("score", Score::parse(raw)),
            None => {
                errors.add("score", SCORE_REQUIRED);
                None
            }
        };

        match (text, score) {
            (Some(text), Some(score)) => Ok(Self { text, score }),
            _ => Err(errors),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn score(&self) -> Score {
        self.score
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReviewCommand {
    text: Option<String>,
    score: Option<Score>,
}

impl PatchReviewCommand {
    pub fn new(text: Option<String>, score: Option<i32>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = match text {
            Some(raw) => errors.check("text", validate_text(&raw)),
            None => None,
        };
        let score = match score {
            Some(raw) => errors.check("score", Score::parse(raw)),
            None => None,
        };

        errors.into_result()?;
        Ok(Self { text, score })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.score.is_none()
    }
}

//
// ──────────────────────────────────────────────────────────
// Use Case Error
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReviewError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Title not found")]
    TitleNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("You have already reviewed this title")]
    AlreadyReviewed,

    #[error("{0}")]
    AccessDenied(AccessDenied),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<ReviewRepositoryError> for ReviewError {
    fn from(err: ReviewRepositoryError) -> Self {
        match err {
            ReviewRepositoryError::AlreadyReviewed => ReviewError::AlreadyReviewed,
            ReviewRepositoryError::NotFound => ReviewError::ReviewNotFound,
            ReviewRepositoryError::DatabaseError(msg) => ReviewError::RepositoryError(msg),
        }
    }
}

impl From<TitleQueryError> for ReviewError {
    fn from(err: TitleQueryError) -> Self {
        ReviewError::RepositoryError(err.to_string())
    }
}

impl From<AccessDenied> for ReviewError {
    fn from(err: AccessDenied) -> Self {
        ReviewError::AccessDenied(err)
    }
}

//
// ──────────────────────────────────────────────────────────
// Use Case Trait
// ──────────────────────────────────────────────────────────
//

/// Reviews nested under a title. Writes take the caller so the use case
/// can run the ownership check once the review is loaded.
#[async_trait]
pub trait ManageReviewsUseCase: Send + Sync {
    async fn list(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<PageResult<Review>, ReviewError>;

    async fn get(&self, title_id: TitleId, review_id: ReviewId) -> Result<Review, ReviewError>;

    async fn create(
        &self,
        caller: &Caller,
        title_id: TitleId,
        command: CreateReviewCommand,
    ) -> Result<Review, ReviewError>;

    async fn update(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        command: PatchReviewCommand,
    ) -> Result<Review, ReviewError>;

    async fn delete(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<(), ReviewError>;
}

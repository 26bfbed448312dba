use async_trait::async_trait;
use tracing::{info, warn};

use crate::auth::application::domain::permissions::{
    authorize, authorize_object, AccessDenied, Caller, OwnerOrModeratorOrAdminOrReadOnly,
    RequestMethod,
};
use crate::catalog::application::domain::entities::TitleId;
use crate::catalog::application::ports::outgoing::TitleQuery;
use crate::review::application::domain::entities::{Review, ReviewId};
use crate::review::application::ports::incoming::use_cases::{
    CreateReviewCommand, ManageReviewsUseCase, PatchReviewCommand, ReviewError,
};
use crate::review::application::ports::outgoing::{
    NewReviewData, ReviewChanges, ReviewRepository,
};
use crate::shared::pagination::{PageRequest, PageResult};

pub struct ReviewService<T, R>
where
    T: TitleQuery,
    R: ReviewRepository,
{
    titles: T,
    reviews: R,
}

impl<T, R> ReviewService<T, R>
where
    T: TitleQuery,
    R: ReviewRepository,
{
    pub fn new(titles: T, reviews: R) -> Self {
        Self { titles, reviews }
    }

    async fn ensure_title(&self, title_id: TitleId) -> Result<(), ReviewError> {
        if self.titles.exists(title_id).await? {
            Ok(())
        } else {
            Err(ReviewError::TitleNotFound)
        }
    }

    async fn load(&self, title_id: TitleId, review_id: ReviewId) -> Result<Review, ReviewError> {
        self.ensure_title(title_id).await?;
        self.reviews
            .find(title_id, review_id)
            .await?
            .ok_or(ReviewError::ReviewNotFound)
    }

    /// Loads the review and runs the object check for `method`.
    async fn load_for_change(
        &self,
        caller: &Caller,
        method: RequestMethod,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Review, ReviewError> {
        let review = self.load(title_id, review_id).await?;

        if let Err(denied) = authorize_object(
            &OwnerOrModeratorOrAdminOrReadOnly,
            caller,
            method,
            review.author_id,
        ) {
            warn!(review_id, caller = ?caller.user_id(), "Review change denied");
            return Err(denied.into());
        }

        Ok(review)
    }
}

#[async_trait]
impl<T, R> ManageReviewsUseCase for ReviewService<T, R>
where
    T: TitleQuery,
    R: ReviewRepository,
{
    async fn list(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<PageResult<Review>, ReviewError> {
        self.ensure_title(title_id).await?;
        Ok(self.reviews.list_for_title(title_id, page).await?)
    }

    async fn get(&self, title_id: TitleId, review_id: ReviewId) -> Result<Review, ReviewError> {
        self.load(title_id, review_id).await
    }

    async fn create(
        &self,
        caller: &Caller,
        title_id: TitleId,
        command: CreateReviewCommand,
    ) -> Result<Review, ReviewError> {
        authorize(&OwnerOrModeratorOrAdminOrReadOnly, caller, RequestMethod::Post)?;
        let Some(author_id) = caller.user_id() else {
            return Err(AccessDenied::NotAuthenticated.into());
        };

        self.ensure_title(title_id).await?;

        // The unique constraint still decides races; this only gives a clean error.
        if self.reviews.exists_for_author(title_id, author_id).await? {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = self
            .reviews
            .create(NewReviewData {
                title_id,
                author_id,
                text: command.text().to_string(),
                score: command.score().value(),
            })
            .await?;

        info!(review_id = review.id, title_id, author = %review.author, "Review created");
        Ok(review)
    }

    async fn update(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        command: PatchReviewCommand,
    ) -> Result<Review, ReviewError> {
        let review = self
            .load_for_change(caller, RequestMethod::Patch, title_id, review_id)
            .await?;

        if command.is_empty() {
            return Ok(review);
        }

        let updated = self
            .reviews
            .update(
                review_id,
                ReviewChanges {
                    text: command.text().map(str::to_string),
                    score: command.score().map(|s| s.value()),
                },
            )
            .await?;

        info!(review_id, title_id, "Review updated");
        Ok(updated)
    }

    async fn delete(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<(), ReviewError> {
        self.load_for_change(caller, RequestMethod::Delete, title_id, review_id)
            .await?;
        self.reviews.delete(review_id).await?;

        info!(review_id, title_id, "Review deleted");
        Ok(())
    }
}

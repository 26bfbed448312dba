use async_trait::async_trait;
use tracing::{info, warn};

use crate::auth::application::domain::permissions::{
    authorize, authorize_object, AccessDenied, Caller, OwnerOrModeratorOrAdminOrReadOnly,
    RequestMethod,
};
use crate::catalog::application::domain::entities::TitleId;
use crate::catalog::application::ports::outgoing::TitleQuery;
use crate::review::application::domain::entities::{Comment, CommentId, ReviewId};
use crate::review::application::ports::incoming::use_cases::{
    CommentCommand, CommentError, ManageCommentsUseCase,
};
use crate::review::application::ports::outgoing::{
    CommentRepository, NewCommentData, ReviewRepository,
};
use crate::shared::pagination::{PageRequest, PageResult};

pub struct CommentService<T, R, C>
where
    T: TitleQuery,
    R: ReviewRepository,
    C: CommentRepository,
{
    titles: T,
    reviews: R,
    comments: C,
}

impl<T, R, C> CommentService<T, R, C>
where
    T: TitleQuery,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub fn new(titles: T, reviews: R, comments: C) -> Self {
        Self {
            titles,
            reviews,
            comments,
        }
    }

    /// The title must exist and own the review.
    async fn ensure_review(&self, title_id: TitleId, review_id: ReviewId) -> Result<(), CommentError> {
        if !self.titles.exists(title_id).await? {
            return Err(CommentError::TitleNotFound);
        }
        match self.reviews.find(title_id, review_id).await? {
            Some(_) => Ok(()),
            None => Err(CommentError::ReviewNotFound),
        }
    }

    async fn load(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Comment, CommentError> {
        self.ensure_review(title_id, review_id).await?;
        self.comments
            .find(review_id, comment_id)
            .await?
            .ok_or(CommentError::CommentNotFound)
    }

    async fn load_for_change(
        &self,
        caller: &Caller,
        method: RequestMethod,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Comment, CommentError> {
        let comment = self.load(title_id, review_id, comment_id).await?;

        if let Err(denied) = authorize_object(
            &OwnerOrModeratorOrAdminOrReadOnly,
            caller,
            method,
            comment.author_id,
        ) {
            warn!(comment_id, caller = ?caller.user_id(), "Comment change denied");
            return Err(denied.into());
        }

        Ok(comment)
    }
}

#[async_trait]
impl<T, R, C> ManageCommentsUseCase for CommentService<T, R, C>
where
    T: TitleQuery,
    R: ReviewRepository,
    C: CommentRepository,
{
    async fn list(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<PageResult<Comment>, CommentError> {
        self.ensure_review(title_id, review_id).await?;
        Ok(self.comments.list_for_review(review_id, page).await?)
    }

    async fn get(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Comment, CommentError> {
        self.load(title_id, review_id, comment_id).await
    }

    async fn create(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        command: CommentCommand,
    ) -> Result<Comment, CommentError> {
        authorize(&OwnerOrModeratorOrAdminOrReadOnly, caller, RequestMethod::Post)?;
        let Some(author_id) = caller.user_id() else {
            return Err(AccessDenied::NotAuthenticated.into());
        };

        self.ensure_review(title_id, review_id).await?;

        let comment = self
            .comments
            .create(NewCommentData {
                review_id,
                author_id,
                text: command.into_text(),
            })
            .await?;

        info!(comment_id = comment.id, review_id, author = %comment.author, "Comment created");
        Ok(comment)
    }

    async fn update(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
        command: Option<CommentCommand>,
    ) -> Result<Comment, CommentError> {
        let comment = self
            .load_for_change(caller, RequestMethod::Patch, title_id, review_id, comment_id)
            .await?;

        let Some(command) = command else {
            return Ok(comment);
        };

        let updated = self.comments.update(comment_id, command.into_text()).await?;
        info!(comment_id, review_id, "Comment updated");
        Ok(updated)
    }

    async fn delete(
        &self,
        caller: &Caller,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<(), CommentError> {
        self.load_for_change(caller, RequestMethod::Delete, title_id, review_id, comment_id)
            .await?;
        self.comments.delete(comment_id).await?;

        info!(comment_id, review_id, "Comment deleted");
        Ok(())
    }
}

pub mod manage_comments;
pub mod manage_reviews;

pub use manage_comments::{CommentCommand, CommentError, ManageCommentsUseCase};
pub use manage_reviews::{
    CreateReviewCommand, ManageReviewsUseCase, PatchReviewCommand, ReviewError,
};

pub mod comment_repository;
pub mod review_repository;

pub use comment_repository::{CommentRepository, CommentRepositoryError, NewCommentData};
pub use review_repository::{
    NewReviewData, ReviewChanges, ReviewRepository, ReviewRepositoryError,
};

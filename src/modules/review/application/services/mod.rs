pub mod comment_service;
pub mod review_service;

pub use comment_service::CommentService;
pub use review_service::ReviewService;

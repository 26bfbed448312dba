pub mod comments;
pub mod reviews;

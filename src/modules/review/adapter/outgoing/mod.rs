pub mod comment_repository_postgres;
pub mod review_repository_postgres;
pub mod sea_orm_entity;

pub use comment_repository_postgres::CommentRepositoryPostgres;
pub use review_repository_postgres::ReviewRepositoryPostgres;

pub mod taxonomy_repository;
pub mod title_query;
pub mod title_repository;

pub use taxonomy_repository::{TaxonomyRepository, TaxonomyRepositoryError};
pub use title_query::{TitleFilter, TitleQuery, TitleQueryError};
pub use title_repository::{NewTitleData, TitleChanges, TitleRepository, TitleRepositoryError};

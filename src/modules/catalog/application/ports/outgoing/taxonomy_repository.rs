use async_trait::async_trait;

use crate::catalog::application::domain::entities::{TaxonomyEntry, TaxonomyKind};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone, thiserror::Error)]
pub enum TaxonomyRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Slug already exists")]
    SlugTaken,

    #[error("Entry not found")]
    NotFound,
}

/// Storage for one kind of reference data; each instance is bound to a
/// single `TaxonomyKind`.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    fn kind(&self) -> TaxonomyKind;

    /// Ordered by name; `search` is a case-insensitive substring of the name.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<TaxonomyEntry>, TaxonomyRepositoryError>;

    /// Only the slugs that exist are returned, in no particular order.
    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<Vec<TaxonomyEntry>, TaxonomyRepositoryError>;

    async fn create(
        &self,
        name: String,
        slug: String,
    ) -> Result<TaxonomyEntry, TaxonomyRepositoryError>;

    async fn delete_by_slug(&self, slug: &str) -> Result<(), TaxonomyRepositoryError>;
}

use async_trait::async_trait;

use crate::catalog::application::domain::entities::{TitleId, TitleView};
use crate::shared::pagination::{PageRequest, PageResult};

/// Listing filters; every field narrows the result when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TitleQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[async_trait]
pub trait TitleQuery: Send + Sync {
    /// Ordered by year descending, then name.
    async fn list(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<PageResult<TitleView>, TitleQueryError>;

    async fn find_by_id(&self, id: TitleId) -> Result<Option<TitleView>, TitleQueryError>;

    async fn exists(&self, id: TitleId) -> Result<bool, TitleQueryError>;
}

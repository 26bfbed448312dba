use async_trait::async_trait;

use crate::catalog::application::domain::entities::TitleId;

#[derive(Debug, Clone, PartialEq)]
pub struct NewTitleData {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

/// `None` keeps the stored value. For the nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i32>>,
    /// Replaces the whole genre set.
    pub genre_ids: Option<Vec<i32>>,
}

impl TitleChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.year.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.genre_ids.is_none()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TitleRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Title not found")]
    NotFound,
}

#[async_trait]
pub trait TitleRepository: Send + Sync {
    /// Inserts the title and its genre links in one transaction.
    async fn create(&self, data: NewTitleData) -> Result<TitleId, TitleRepositoryError>;

    async fn update(&self, id: TitleId, changes: TitleChanges) -> Result<(), TitleRepositoryError>;

    async fn delete(&self, id: TitleId) -> Result<(), TitleRepositoryError>;
}

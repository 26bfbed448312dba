use async_trait::async_trait;
use tracing::info;

use crate::catalog::application::domain::entities::{TaxonomyEntry, TaxonomyKind};
use crate::catalog::application::ports::incoming::use_cases::manage_taxonomy::slug_taken;
use crate::catalog::application::ports::incoming::use_cases::{
    CreateTaxonomyCommand, ManageTaxonomyUseCase, TaxonomyError,
};
use crate::catalog::application::ports::outgoing::{TaxonomyRepository, TaxonomyRepositoryError};
use crate::shared::pagination::{PageRequest, PageResult};

pub struct TaxonomyService<R>
where
    R: TaxonomyRepository,
{
    repository: R,
}

impl<R> TaxonomyService<R>
where
    R: TaxonomyRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_err(&self, err: TaxonomyRepositoryError) -> TaxonomyError {
        TaxonomyError::from_repository(self.repository.kind(), err)
    }
}

#[async_trait]
impl<R> ManageTaxonomyUseCase for TaxonomyService<R>
where
    R: TaxonomyRepository,
{
    fn kind(&self) -> TaxonomyKind {
        self.repository.kind()
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<TaxonomyEntry>, TaxonomyError> {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        self.repository
            .list(search, page)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn create(&self, command: CreateTaxonomyCommand) -> Result<TaxonomyEntry, TaxonomyError> {
        let existing = self
            .repository
            .find_by_slugs(&[command.slug().to_string()])
            .await
            .map_err(|e| self.map_err(e))?;

        if !existing.is_empty() {
            return Err(TaxonomyError::Validation(slug_taken(self.kind())));
        }

        let (name, slug) = command.into_parts();
        let entry = self
            .repository
            .create(name, slug)
            .await
            .map_err(|e| self.map_err(e))?;

        info!(kind = %self.kind(), slug = %entry.slug, "Taxonomy entry created");
        Ok(entry)
    }

    async fn delete(&self, slug: &str) -> Result<(), TaxonomyError> {
        self.repository
            .delete_by_slug(slug)
            .await
            .map_err(|e| self.map_err(e))?;

        info!(kind = %self.kind(), slug = %slug, "Taxonomy entry deleted");
        Ok(())
    }
}

use async_trait::async_trait;
use tracing::info;

use crate::catalog::application::domain::entities::{TaxonomyKind, TitleId, TitleView};
use crate::catalog::application::ports::incoming::use_cases::{
    CreateTitleCommand, ManageTitlesUseCase, PatchTitleCommand, TitleError,
};
use crate::catalog::application::ports::outgoing::{
    NewTitleData, TaxonomyRepository, TitleChanges, TitleFilter, TitleQuery, TitleRepository,
};
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::validation::FieldErrors;

/// Title reads and writes. Genre and category slugs in write bodies are
/// resolved to ids here; unknown slugs are field errors.
pub struct TitleService<Q, R, T>
where
    Q: TitleQuery,
    R: TitleRepository,
    T: TaxonomyRepository,
{
    query: Q,
    repository: R,
    categories: T,
    genres: T,
}

impl<Q, R, T> TitleService<Q, R, T>
where
    Q: TitleQuery,
    R: TitleRepository,
    T: TaxonomyRepository,
{
    pub fn new(query: Q, repository: R, categories: T, genres: T) -> Self {
        Self {
            query,
            repository,
            categories,
            genres,
        }
    }

    /// Ids in the order the slugs were given; unknown slugs are recorded on `errors`.
    async fn resolve(
        &self,
        kind: TaxonomyKind,
        slugs: &[String],
        errors: &mut FieldErrors,
    ) -> Result<Vec<i32>, TitleError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let repository = match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Genre => &self.genres,
        };
        let found = repository.find_by_slugs(slugs).await?;

        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            match found.iter().find(|entry| &entry.slug == slug) {
                Some(entry) => ids.push(entry.id),
                None => errors.add(kind.as_str(), format!("Unknown {} slug '{}'", kind, slug)),
            }
        }
        Ok(ids)
    }

    async fn resolve_category(
        &self,
        slug: Option<String>,
        errors: &mut FieldErrors,
    ) -> Result<Option<i32>, TitleError> {
        let Some(slug) = slug else {
            return Ok(None);
        };
        let ids = self.resolve(TaxonomyKind::Category, &[slug], errors).await?;
        Ok(ids.first().copied())
    }

    async fn load(&self, id: TitleId) -> Result<TitleView, TitleError> {
        self.query.find_by_id(id).await?.ok_or(TitleError::NotFound)
    }
}

#[async_trait]
impl<Q, R, T> ManageTitlesUseCase for TitleService<Q, R, T>
where
    Q: TitleQuery,
    R: TitleRepository,
    T: TaxonomyRepository,
{
    async fn list(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<PageResult<TitleView>, TitleError> {
        let filter = TitleFilter {
            category: filter.category.filter(|s| !s.trim().is_empty()),
            genre: filter.genre.filter(|s| !s.trim().is_empty()),
            name: filter
                .name
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            year: filter.year,
        };

        Ok(self.query.list(filter, page).await?)
    }

    async fn get(&self, id: TitleId) -> Result<TitleView, TitleError> {
        self.load(id).await
    }

    async fn create(&self, command: CreateTitleCommand) -> Result<TitleView, TitleError> {
        let mut errors = FieldErrors::new();
        let genre_ids = self
            .resolve(TaxonomyKind::Genre, &command.genre_slugs, &mut errors)
            .await?;
        let category_id = self.resolve_category(command.category_slug, &mut errors).await?;
        errors.into_result().map_err(TitleError::Validation)?;

        let id = self
            .repository
            .create(NewTitleData {
                name: command.name,
                year: command.year,
                description: command.description,
                category_id,
                genre_ids,
            })
            .await?;

        info!(title_id = id, "Title created");
        self.load(id).await
    }

    async fn update(
        &self,
        id: TitleId,
        command: PatchTitleCommand,
    ) -> Result<TitleView, TitleError> {
        if !self.query.exists(id).await? {
            return Err(TitleError::NotFound);
        }

        if command.is_empty() {
            return self.load(id).await;
        }

        let mut errors = FieldErrors::new();
        let genre_ids = match &command.genre_slugs {
            Some(slugs) => Some(self.resolve(TaxonomyKind::Genre, slugs, &mut errors).await?),
            None => None,
        };
        let category_id = match command.category_slug {
            Some(slug) => Some(self.resolve_category(slug, &mut errors).await?),
            None => None,
        };
        errors.into_result().map_err(TitleError::Validation)?;

        self.repository
            .update(
                id,
                TitleChanges {
                    name: command.name,
                    year: command.year,
                    description: command.description,
                    category_id,
                    genre_ids,
                },
            )
            .await?;

        info!(title_id = id, "Title updated");
        self.load(id).await
    }

    async fn delete(&self, id: TitleId) -> Result<(), TitleError> {
        self.repository.delete(id).await?;
        info!(title_id = id, "Title deleted");
        Ok(())
    }
}

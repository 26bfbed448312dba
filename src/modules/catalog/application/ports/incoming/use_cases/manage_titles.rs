use async_trait::async_trait;

use crate::catalog::application::domain::entities::{
    validate_name, validate_year, TitleId, TitleView,
};
use crate::catalog::application::ports::outgoing::{
    TaxonomyRepositoryError, TitleFilter, TitleQueryError, TitleRepositoryError,
};
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::patch::PatchField;
use crate::shared::validation::FieldErrors;

const YEAR_REQUIRED: &str = "Year is required";

fn normalize_description(raw: String) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn normalize_slugs(raw: Vec<String>) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::with_capacity(raw.len());
    for slug in raw {
        let slug = slug.trim().to_string();
        if !slug.is_empty() && !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    slugs
}

//
// ──────────────────────────────────────────────────────────
// Create Title Command
// ──────────────────────────────────────────────────────────
//

/// Title body as submitted; slugs are resolved by the use case.
#[derive(Debug, Clone, Default)]
pub struct TitleDraft {
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTitleCommand {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub genre_slugs: Vec<String>,
    pub category_slug: Option<String>,
}

impl CreateTitleCommand {
    pub fn new(draft: TitleDraft) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.check("name", validate_name(&draft.name));
        let year = match draft.year {
            Some(year) => errors.check("year", validate_year(year)),
            None => {
                errors.add("year", YEAR_REQUIRED);
                None
            }
        };

        match (name, year) {
            (Some(name), Some(year)) => Ok(Self {
                name,
                year,
                description: draft.description.and_then(normalize_description),
                genre_slugs: normalize_slugs(draft.genre),
                category_slug: draft
                    .category
                    .map(|slug| slug.trim().to_string())
                    .filter(|slug| !slug.is_empty()),
            }),
            _ => Err(errors),
        }
    }
}

//
// ──────────────────────────────────────────────────────────
// Patch Title Command
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: PatchField<String>,
    pub genre: Option<Vec<String>>,
    pub category: PatchField<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchTitleCommand {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub genre_slugs: Option<Vec<String>>,
    pub category_slug: Option<Option<String>>,
}

impl PatchTitleCommand {
    pub fn new(patch: TitlePatch) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = match patch.name {
            Some(raw) => errors.check("name", validate_name(&raw)),
            None => None,
        };
        let year = match patch.year {
            Some(year) => errors.check("year", validate_year(year)),
            None => None,
        };

        errors.into_result()?;

        Ok(Self {
            name,
            year,
            description: patch
                .description
                .into_update()
                .map(|value| value.and_then(normalize_description)),
            genre_slugs: patch.genre.map(normalize_slugs),
            category_slug: patch.category.into_update().map(|value| {
                value
                    .map(|slug| slug.trim().to_string())
                    .filter(|slug| !slug.is_empty())
            }),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

//
// ──────────────────────────────────────────────────────────
// Use Case Error
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, thiserror::Error)]
pub enum TitleError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Title not found")]
    NotFound,

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<TitleQueryError> for TitleError {
    fn from(err: TitleQueryError) -> Self {
        match err {
            TitleQueryError::DatabaseError(msg) => TitleError::RepositoryError(msg),
        }
    }
}

impl From<TitleRepositoryError> for TitleError {
    fn from(err: TitleRepositoryError) -> Self {
        match err {
            TitleRepositoryError::NotFound => TitleError::NotFound,
            TitleRepositoryError::DatabaseError(msg) => TitleError::RepositoryError(msg),
        }
    }
}

impl From<TaxonomyRepositoryError> for TitleError {
    fn from(err: TaxonomyRepositoryError) -> Self {
        TitleError::RepositoryError(err.to_string())
    }
}

//
// ──────────────────────────────────────────────────────────
// Use Case Trait
// ──────────────────────────────────────────────────────────
//

#[async_trait]
pub trait ManageTitlesUseCase: Send + Sync {
    async fn list(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<PageResult<TitleView>, TitleError>;

    async fn get(&self, id: TitleId) -> Result<TitleView, TitleError>;

    async fn create(&self, command: CreateTitleCommand) -> Result<TitleView, TitleError>;

    async fn update(&self, id: TitleId, command: PatchTitleCommand)
        -> Result<TitleView, TitleError>;

    async fn delete(&self, id: TitleId) -> Result<(), TitleError>;
}

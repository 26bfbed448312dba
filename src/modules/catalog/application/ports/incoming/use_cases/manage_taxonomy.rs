use async_trait::async_trait;

use crate::catalog::application::domain::entities::{
    validate_name, Slug, TaxonomyEntry, TaxonomyKind,
};
use crate::catalog::application::ports::outgoing::TaxonomyRepositoryError;
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::validation::FieldErrors;

//
// ──────────────────────────────────────────────────────────
// Create Command
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaxonomyCommand {
    name: String,
    slug: Slug,
}

impl CreateTaxonomyCommand {
    pub fn new(name: &str, slug: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", validate_name(name));
        let slug = errors.check("slug", Slug::parse(slug));

        match (name, slug) {
            (Some(name), Some(slug)) => Ok(Self { name, slug }),
            _ => Err(errors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    pub fn into_parts(self) -> (String, String) {
        (self.name, self.slug.into_inner())
    }
}

//
// ──────────────────────────────────────────────────────────
// Use Case Error
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, thiserror::Error)]
pub enum TaxonomyError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

pub fn slug_taken(kind: TaxonomyKind) -> FieldErrors {
    FieldErrors::single("slug", &format!("A {} with this slug already exists", kind))
}

impl TaxonomyError {
    pub fn from_repository(kind: TaxonomyKind, err: TaxonomyRepositoryError) -> Self {
        match err {
            TaxonomyRepositoryError::SlugTaken => TaxonomyError::Validation(slug_taken(kind)),
            TaxonomyRepositoryError::NotFound => TaxonomyError::NotFound,
            TaxonomyRepositoryError::DatabaseError(msg) => TaxonomyError::RepositoryError(msg),
        }
    }
}

//
// ──────────────────────────────────────────────────────────
// Use Case Trait
// ──────────────────────────────────────────────────────────
//

/// Categories and genres: list, create and delete by slug. There is no update.
#[async_trait]
pub trait ManageTaxonomyUseCase: Send + Sync {
    fn kind(&self) -> TaxonomyKind;

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<TaxonomyEntry>, TaxonomyError>;

    async fn create(&self, command: CreateTaxonomyCommand) -> Result<TaxonomyEntry, TaxonomyError>;

    async fn delete(&self, slug: &str) -> Result<(), TaxonomyError>;
}

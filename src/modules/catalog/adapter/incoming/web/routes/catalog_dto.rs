use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::application::domain::entities::{TaxonomyEntry, TitleView};
use crate::catalog::application::ports::incoming::use_cases::{TitleDraft, TitlePatch};
use crate::catalog::application::ports::outgoing::TitleFilter;
use crate::shared::patch::PatchField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaxonomyResponse {
    #[schema(example = "Films")]
    pub name: String,
    #[schema(example = "movie")]
    pub slug: String,
}

impl From<TaxonomyEntry> for TaxonomyResponse {
    fn from(entry: TaxonomyEntry) -> Self {
        Self {
            name: entry.name,
            slug: entry.slug,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTaxonomyRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TitleResponse {
    pub id: i32,
    pub name: String,
    pub year: i32,
    /// Mean review score; `null` until the title has reviews
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<TaxonomyResponse>,
    pub category: Option<TaxonomyResponse>,
}

impl From<TitleView> for TitleResponse {
    fn from(view: TitleView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            year: view.year,
            rating: view.rating,
            description: view.description,
            genre: view.genres.into_iter().map(TaxonomyResponse::from).collect(),
            category: view.category.map(TaxonomyResponse::from),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleListQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl From<TitleListQuery> for TitleFilter {
    fn from(query: TitleListQuery) -> Self {
        Self {
            category: query.category,
            genre: query.genre,
            name: query.name,
            year: query.year,
        }
    }
}

/// `genre` and `category` are slugs.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: Option<String>,
}

impl From<CreateTitleRequest> for TitleDraft {
    fn from(req: CreateTitleRequest) -> Self {
        Self {
            name: req.name,
            year: req.year,
            description: req.description,
            genre: req.genre,
            category: req.category,
        }
    }
}

/// `null` clears `description` or `category`; an omitted key keeps it.
#[derive(Debug, Default, Deserialize)]
pub struct PatchTitleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: PatchField<String>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    #[serde(default)]
    pub category: PatchField<String>,
}

impl From<PatchTitleRequest> for TitlePatch {
    fn from(req: PatchTitleRequest) -> Self {
        Self {
            name: req.name,
            year: req.year,
            description: req.description,
            genre: req.genre,
            category: req.category,
        }
    }
}

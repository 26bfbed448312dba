use std::sync::Arc;

use crate::catalog::application::ports::incoming::use_cases::{
    ManageTaxonomyUseCase, ManageTitlesUseCase,
};

#[derive(Clone)]
pub struct CatalogUseCases {
    pub categories: Arc<dyn ManageTaxonomyUseCase + Send + Sync>,
    pub genres: Arc<dyn ManageTaxonomyUseCase + Send + Sync>,
    pub titles: Arc<dyn ManageTitlesUseCase + Send + Sync>,
}

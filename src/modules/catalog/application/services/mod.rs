pub mod taxonomy_service;
pub mod title_service;

pub use taxonomy_service::TaxonomyService;
pub use title_service::TitleService;

pub mod manage_taxonomy;
pub mod manage_titles;

pub use manage_taxonomy::{CreateTaxonomyCommand, ManageTaxonomyUseCase, TaxonomyError};
pub use manage_titles::{
    CreateTitleCommand, ManageTitlesUseCase, PatchTitleCommand, TitleDraft, TitleError, TitlePatch,
};

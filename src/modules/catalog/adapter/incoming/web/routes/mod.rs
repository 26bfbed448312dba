mod catalog_dto;
mod taxonomy;
mod titles;

pub use catalog_dto::{TaxonomyResponse, TitleResponse};
pub use taxonomy::{
    create_category_handler, create_genre_handler, delete_category_handler, delete_genre_handler,
    list_categories_handler, list_genres_handler,
};
pub use titles::{
    create_title_handler, delete_title_handler, get_title_handler, list_titles_handler,
    patch_title_handler,
};

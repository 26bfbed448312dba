pub mod api;
pub mod db;
pub mod pagination;
pub mod patch;
pub mod search;
pub mod validation;

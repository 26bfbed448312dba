pub mod auth;

pub use auth::{access_denied_response, check_access};

pub mod confirmation_code_generator;
pub mod token_provider;
pub mod user_query;
pub mod user_repository;

pub use confirmation_code_generator::ConfirmationCodeGenerator;
pub use token_provider::{TokenClaims, TokenError, TokenProvider};
pub use user_query::{UserQuery, UserQueryError};
pub use user_repository::{CreateUserData, UpdateUserData, UserRepository, UserRepositoryError};

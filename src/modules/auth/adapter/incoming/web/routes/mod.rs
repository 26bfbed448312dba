mod me;
pub mod obtain_token;
pub mod signup;
mod user_dto;
mod users;

pub use me::{get_me_handler, patch_me_handler};
pub use obtain_token::{obtain_token_handler, ObtainTokenRequest, TokenResponse};
pub use signup::{signup_handler, SignupRequest, SignupResponse};
pub use user_dto::UserResponse;
pub use users::{
    create_user_handler, delete_user_handler, get_user_handler, list_users_handler,
    patch_user_handler,
};

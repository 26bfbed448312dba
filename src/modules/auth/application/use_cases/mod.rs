pub mod bootstrap_admin;
pub mod manage_users;
pub mod obtain_token;
pub mod profile;
pub mod request_signup;
pub mod user_fields;

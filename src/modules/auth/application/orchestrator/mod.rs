pub mod user_signup;

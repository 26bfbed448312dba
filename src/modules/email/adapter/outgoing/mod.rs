pub mod log_sender;
pub mod smtp_sender;

pub mod confirmation_code_notifier;
pub mod email_sender;

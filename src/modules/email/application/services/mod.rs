pub mod confirmation_email_service;

pub use confirmation_email_service::ConfirmationEmailService;

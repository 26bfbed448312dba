#[derive(Debug, Clone)]
pub struct ConfirmationCodeMessage {
    pub username: String,
    pub email: String,
    pub confirmation_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmationCodeNotificationError {
    #[error("Email sending failed: {0}")]
    EmailSendingFailed(String),
}

#[async_trait::async_trait]
pub trait ConfirmationCodeNotifier: Send + Sync {
    async fn send_confirmation_code(
        &self,
        message: ConfirmationCodeMessage,
    ) -> Result<(), ConfirmationCodeNotificationError>;
}

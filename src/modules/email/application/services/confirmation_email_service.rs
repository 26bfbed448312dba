use crate::email::application::ports::outgoing::confirmation_code_notifier::{
    ConfirmationCodeMessage, ConfirmationCodeNotificationError, ConfirmationCodeNotifier,
};
use crate::email::application::ports::outgoing::email_sender::EmailSender;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub const CONFIRMATION_SUBJECT: &str = "Your confirmation code";

#[derive(Clone)]
pub struct ConfirmationEmailService {
    sender: Arc<dyn EmailSender + Send + Sync>,
}

impl fmt::Debug for ConfirmationEmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationEmailService")
            .field("sender", &"<dyn EmailSender>")
            .finish()
    }
}

impl ConfirmationEmailService {
    pub fn new(sender: Arc<dyn EmailSender + Send + Sync>) -> Self {
        Self { sender }
    }

    fn render_body(message: &ConfirmationCodeMessage) -> String {
        format!(
            "<p>Hello {},</p>\
             <p>Use this code to obtain your access token:</p>\
             <p><strong>{}</strong></p>\
             <p>The code works once. Sign up again with the same username and email to get a new one.</p>",
            message.username, message.confirmation_code
        )
    }
}

#[async_trait]
impl ConfirmationCodeNotifier for ConfirmationEmailService {
    async fn send_confirmation_code(
        &self,
        message: ConfirmationCodeMessage,
    ) -> Result<(), ConfirmationCodeNotificationError> {
        let body = Self::render_body(&message);
        self.sender
            .send_email(&message.email, CONFIRMATION_SUBJECT, &body)
            .await
            .map_err(ConfirmationCodeNotificationError::EmailSendingFailed)
    }
}

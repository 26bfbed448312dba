use crate::email::application::ports::outgoing::email_sender::EmailSender;
use async_trait::async_trait;

/// Development backend: writes outgoing mail to the log instead of sending it.
/// The body, which carries the confirmation code, is only emitted at `debug`.
#[derive(Debug, Default, Clone)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        tracing::info!(to = %to, subject = %subject, "Email (log backend)");
        tracing::debug!(to = %to, body = %body, "Email body (log backend)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_succeeds() {
        let sender = LogEmailSender::new();

        assert!(sender.send_email("a@x.com", "Hi", "<p>Body</p>").await.is_ok());
    }
}

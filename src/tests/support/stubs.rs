use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::application::ports::outgoing::token_provider::{
    TokenClaims, TokenError, TokenProvider,
};
use crate::auth::application::ports::outgoing::ConfirmationCodeGenerator;
use crate::email::application::ports::outgoing::confirmation_code_notifier::{
    ConfirmationCodeMessage, ConfirmationCodeNotificationError, ConfirmationCodeNotifier,
};

/// Predictable codes: `CODE0001`, `CODE0002`, ...
#[derive(Default)]
pub struct SequenceCodeGenerator {
    counter: AtomicU32,
}

impl SequenceCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfirmationCodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("CODE{:04}", n)
    }
}

/// Accepts any token except [`Self::REJECTED_TOKEN`] and reports a fixed subject.
pub struct StubTokenProvider {
    subject: Uuid,
}

impl StubTokenProvider {
    pub const REJECTED_TOKEN: &'static str = "rejected";

    pub fn new(subject: Uuid) -> Self {
        Self { subject }
    }
}

impl TokenProvider for StubTokenProvider {
    fn generate_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        Ok(format!("access-{}", user_id))
    }

    fn verify_access_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if token == Self::REJECTED_TOKEN {
            return Err(TokenError::InvalidSignature);
        }

        let now = Utc::now().timestamp();
        Ok(TokenClaims {
            sub: self.subject,
            iss: "test".to_string(),
            exp: now + 3600,
            iat: now,
            nbf: now,
            token_type: "access".to_string(),
        })
    }
}

/// Keeps every delivered message; delivery runs in the background, so
/// tests wait for the code instead of reading it right away.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ConfirmationCodeMessage>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_code_for(&self, username: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.username == username)
            .map(|m| m.confirmation_code.clone())
    }

    /// Polls for up to a second.
    pub async fn wait_for_code(&self, username: &str) -> String {
        for _ in 0..100 {
            if let Some(code) = self.last_code_for(username) {
                return code;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no confirmation code delivered to {}", username);
    }
}

#[async_trait]
impl ConfirmationCodeNotifier for RecordingNotifier {
    async fn send_confirmation_code(
        &self,
        message: ConfirmationCodeMessage,
    ) -> Result<(), ConfirmationCodeNotificationError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

use std::sync::Arc;
use std::time::Duration;

use crate::auth::application::use_cases::request_signup::{
    IRequestSignupUseCase, SignupError, SignupInput,
};
use crate::email::application::ports::outgoing::confirmation_code_notifier::{
    ConfirmationCodeMessage, ConfirmationCodeNotifier,
};

const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// What the client gets back: the identity it submitted, never the code.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSignupOutput {
    pub username: String,
    pub email: String,
}

// ============================================================================
// User Signup Orchestrator
// ============================================================================

#[derive(Clone)]
pub struct UserSignupOrchestrator {
    signup_use_case: Arc<dyn IRequestSignupUseCase + Send + Sync>,
    notifier: Arc<dyn ConfirmationCodeNotifier + Send + Sync>,
}

impl UserSignupOrchestrator {
    pub fn new(
        signup_use_case: Arc<dyn IRequestSignupUseCase + Send + Sync>,
        notifier: Arc<dyn ConfirmationCodeNotifier + Send + Sync>,
    ) -> Self {
        Self {
            signup_use_case,
            notifier,
        }
    }

    /// 1. Creates or reuses the account and issues a fresh code
    /// 2. Delivers the code in the background
    pub async fn signup(&self, input: SignupInput) -> Result<UserSignupOutput, SignupError> {
        let issued = self.signup_use_case.execute(input).await?;

        tracing::info!(
            username = %issued.username,
            newly_created = issued.newly_created,
            "Confirmation code issued"
        );

        let notifier = self.notifier.clone();
        let message = ConfirmationCodeMessage {
            username: issued.username.clone(),
            email: issued.email.clone(),
            confirmation_code: issued.confirmation_code,
        };

        tokio::spawn(async move {
            for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
                match notifier.send_confirmation_code(message.clone()).await {
                    Ok(()) => return,
                    Err(e) if attempt < MAX_DELIVERY_ATTEMPTS => {
                        tracing::warn!(
                            username = %message.username,
                            attempt,
                            error = %e,
                            "Confirmation email failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
                    }
                    Err(e) => {
                        tracing::error!(
                            username = %message.username,
                            attempts = MAX_DELIVERY_ATTEMPTS,
                            error = %e,
                            "Confirmation email could not be delivered"
                        );
                    }
                }
            }
        });

        Ok(UserSignupOutput {
            username: issued.username,
            email: issued.email,
        })
    }
}

use thiserror::Error;

use crate::llm_client::LlmError;
use crate::store::StoreError;
use crate::telegram::TelegramError;

/// The only reply a user sees when a command fails unexpectedly.
pub const GENERIC_ERROR_REPLY: &str = "Error happened with your request";

/// Bot-level error type.
/// Every handler returns `Result<(), BotError>`; the command error boundary
/// logs the full error and replies with `GENERIC_ERROR_REPLY`.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),
}

impl BotError {
    /// Short machine-readable tag for operator logs.
    pub fn code(&self) -> &'static str {
        match self {
            BotError::Store(_) => "STORAGE_ERROR",
            BotError::Llm(_) => "LLM_ERROR",
            BotError::Telegram(_) => "TELEGRAM_ERROR",
        }
    }

    /// What the user is told. Never carries error detail.
    pub fn user_message(&self) -> &'static str {
        GENERIC_ERROR_REPLY
    }
}

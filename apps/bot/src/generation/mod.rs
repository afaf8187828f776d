//! Generation Orchestrator: stored résumé + job description → tailored
//! résumé and cover letter.
//!
//! The two completions share no intermediate state and run concurrently.
//! If either fails, neither document is returned.

use std::sync::Arc;

use tracing::info;

use crate::llm_client::prompts;
use crate::llm_client::{CompletionModel, LlmError};

pub const RESUME_BANNER: &str = "Here's your tailored resume based on the provided job description:";
pub const COVER_LETTER_BANNER: &str =
    "Here's your cover letter tailored to the same job description:";

/// Both generated documents, raw model text without banners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailoredDocuments {
    pub resume: String,
    pub cover_letter: String,
}

impl TailoredDocuments {
    /// The two outgoing messages, résumé first.
    pub fn messages(&self) -> [String; 2] {
        [
            format!("{RESUME_BANNER}\n\n{}", self.resume),
            format!("{COVER_LETTER_BANNER}\n\n{}", self.cover_letter),
        ]
    }
}

#[derive(Clone)]
pub struct Generator {
    model: Arc<dyn CompletionModel>,
}

impl Generator {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn generate(
        &self,
        resume: &str,
        job_description: &str,
    ) -> Result<TailoredDocuments, LlmError> {
        let resume_prompt = prompts::tailored_resume(resume, job_description);
        let cover_letter_prompt = prompts::cover_letter(resume, job_description);

        let (tailored, cover_letter) = tokio::try_join!(
            self.model.complete(&resume_prompt),
            self.model.complete(&cover_letter_prompt),
        )?;

        info!(
            "Generated resume ({} bytes) and cover letter ({} bytes)",
            tailored.len(),
            cover_letter.len()
        );

        Ok(TailoredDocuments {
            resume: tailored,
            cover_letter,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::llm_client::{CompletionModel, LlmError};

    /// Scripted model: answers by prompt kind and counts calls.
    #[derive(Default)]
    pub struct FakeModel {
        pub calls: AtomicUsize,
        pub fail_cover_letter: bool,
        pub delay: Option<Duration>,
    }

    impl FakeModel {
        pub fn failing_cover_letter() -> Self {
            Self {
                fail_cover_letter: true,
                ..Self::default()
            }
        }

        pub fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionModel for FakeModel {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if prompt.contains("cover letter") {
                if self.fail_cover_letter {
                    return Err(LlmError::Api {
                        status: 400,
                        message: "context length exceeded".to_string(),
                    });
                }
                Ok("Dear hiring manager".to_string())
            } else {
                Ok("TAILORED RESUME".to_string())
            }
        }
    }
}

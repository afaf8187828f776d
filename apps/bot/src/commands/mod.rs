//! Command handlers: /start, /hello, /setup, /generate.
//!
//! Each handler is a one-shot computation over the resume store; nothing is
//! kept in memory between messages. Handlers return `Result<(), BotError>`
//! and every invocation runs inside `with_error_boundary`.

use std::future::Future;

use tracing::{debug, error, info};

use crate::errors::BotError;
use crate::state::AppState;
use crate::telegram::{Message, User};

mod parse;

pub use parse::Command;

pub const SETUP_USAGE_REPLY: &str = "Please send your resume as a text message. \nLike '/setup ....'";
pub const NEEDS_SETUP_REPLY: &str = "Please provide your resume with /setup.";
pub const NEEDS_JOB_DESCRIPTION_REPLY: &str = "Please provide job description too";

/// Who sent the command and where replies go.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub chat_id: i64,
    pub user: &'a User,
}

impl Invocation<'_> {
    /// Resume store key for the caller.
    fn user_key(&self) -> String {
        self.user.id.to_string()
    }
}

/// Entry point for every incoming message.
pub async fn handle_message(state: &AppState, message: &Message) {
    let Some(text) = message.text.as_deref() else {
        debug!("Ignoring message {} without text", message.message_id);
        return;
    };
    let Some(user) = message.from.as_ref() else {
        debug!("Ignoring message {} without sender", message.message_id);
        return;
    };
    let Some(command) = Command::parse(text, &state.bot_username) else {
        debug!("Ignoring non-command message from {}", user.id);
        return;
    };

    info!("Received /{} from user {}", command.name(), user.id);

    let invocation = Invocation {
        chat_id: message.chat.id,
        user,
    };
    with_error_boundary(state, invocation.chat_id, command.name(), async {
        match command {
            Command::Start => handle_start(state, invocation).await,
            Command::Hello => handle_hello(state, invocation).await,
            Command::Setup(resume) => handle_setup(state, invocation, resume).await,
            Command::Generate(job_description) => {
                handle_generate(state, invocation, job_description).await
            }
        }
    })
    .await;
}

/// Runs a handler and turns any failure into the generic user-facing reply.
/// The original error only goes to the operator log.
pub async fn with_error_boundary<F>(state: &AppState, chat_id: i64, tag: &str, handler: F)
where
    F: Future<Output = Result<(), BotError>>,
{
    let Err(e) = handler.await else {
        return;
    };

    error!("{tag} failed [{}]: {e}", e.code());

    if let Err(send_err) = state.messenger.send_message(chat_id, e.user_message()).await {
        error!("{tag}: could not deliver error reply to {chat_id}: {send_err}");
    }
}

async fn reply(state: &AppState, invocation: Invocation<'_>, text: &str) -> Result<(), BotError> {
    state
        .messenger
        .send_message(invocation.chat_id, text)
        .await?;
    Ok(())
}

pub async fn handle_start(state: &AppState, invocation: Invocation<'_>) -> Result<(), BotError> {
    let text = format!(
        "Hello {}, please provide you resume via command /setup ...",
        invocation.user.display_name()
    );
    reply(state, invocation, &text).await
}

pub async fn handle_hello(state: &AppState, invocation: Invocation<'_>) -> Result<(), BotError> {
    let text = format!("Hello {}", invocation.user.display_name());
    reply(state, invocation, &text).await
}

/// Stores `resume` for the caller, replacing any earlier one.
pub async fn handle_setup(
    state: &AppState,
    invocation: Invocation<'_>,
    resume: &str,
) -> Result<(), BotError> {
    if resume.trim().is_empty() {
        return reply(state, invocation, SETUP_USAGE_REPLY).await;
    }

    let user_key = invocation.user_key();
    state.store.upsert(&user_key, resume).await?;
    info!("Stored resume for user {} ({} bytes)", user_key, resume.len());

    let text = format!("Resume successfully stored with ID: {user_key}");
    reply(state, invocation, &text).await
}

/// Generates the tailored résumé and cover letter and sends them, résumé first.
/// Nothing is sent unless both documents were generated.
pub async fn handle_generate(
    state: &AppState,
    invocation: Invocation<'_>,
    job_description: &str,
) -> Result<(), BotError> {
    let user_key = invocation.user_key();

    let Some(resume) = state.store.get(&user_key).await? else {
        return reply(state, invocation, NEEDS_SETUP_REPLY).await;
    };

    if job_description.trim().is_empty() {
        return reply(state, invocation, NEEDS_JOB_DESCRIPTION_REPLY).await;
    }

    info!("Generating documents for user {}", user_key);
    let documents = state.generator.generate(&resume, job_description).await?;

    for message in documents.messages() {
        reply(state, invocation, &message).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::errors::GENERIC_ERROR_REPLY;
    use crate::generation::testing::FakeModel;
    use crate::generation::Generator;
    use crate::store::{JsonFileStore, ResumeStore};
    use crate::telegram::testing::RecordingMessenger;
    use crate::telegram::Chat;

    const USER_ID: i64 = 123456789;
    const CHAT_ID: i64 = 987654321;

    struct Harness {
        state: AppState,
        store: Arc<JsonFileStore>,
        messenger: Arc<RecordingMessenger>,
        model: Arc<FakeModel>,
        _dir: TempDir,
    }

    fn harness_with(model: FakeModel, messenger: RecordingMessenger) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("resumes.json")));
        let messenger = Arc::new(messenger);
        let model = Arc::new(model);
        let state = AppState {
            store: store.clone(),
            messenger: messenger.clone(),
            generator: Generator::new(model.clone()),
            bot_username: "TailorBot".to_string(),
        };
        Harness {
            state,
            store,
            messenger,
            model,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeModel::default(), RecordingMessenger::default())
    }

    fn message(text: &str) -> Message {
        Message {
            message_id: 1,
            chat: Chat { id: CHAT_ID },
            from: Some(User {
                id: USER_ID,
                first_name: "Grace".to_string(),
                last_name: Some("Hopper".to_string()),
                username: None,
            }),
            text: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_start_greets_and_points_to_setup() {
        let h = harness();
        handle_message(&h.state, &message("/start")).await;

        assert_eq!(
            h.messenger.sent(),
            vec![(
                CHAT_ID,
                "Hello Grace Hopper, please provide you resume via command /setup ...".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_hello_greets() {
        let h = harness();
        handle_message(&h.state, &message("/hello")).await;
        assert_eq!(h.messenger.texts(), vec!["Hello Grace Hopper".to_string()]);
    }

    #[tokio::test]
    async fn test_setup_stores_resume_and_confirms_id() {
        let h = harness();
        handle_message(
            &h.state,
            &message("/setup I am a backend engineer with 5 years Go experience."),
        )
        .await;

        let texts = h.messenger.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Resume successfully stored with ID: 123456789"));

        let resumes = h.store.load().await.unwrap();
        assert_eq!(
            resumes["123456789"],
            "I am a backend engineer with 5 years Go experience."
        );
    }

    #[tokio::test]
    async fn test_setup_whitespace_only_leaves_store_untouched() {
        let h = harness();
        h.store.upsert("123456789", "old resume").await.unwrap();

        handle_message(&h.state, &message("/setup    ")).await;

        assert_eq!(h.messenger.texts(), vec![SETUP_USAGE_REPLY.to_string()]);
        assert_eq!(
            h.store.get("123456789").await.unwrap().as_deref(),
            Some("old resume")
        );
    }

    #[tokio::test]
    async fn test_setup_overwrites_previous_resume() {
        let h = harness();
        handle_message(&h.state, &message("/setup first")).await;
        handle_message(&h.state, &message("/setup second")).await;

        assert_eq!(
            h.store.get("123456789").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_generate_without_resume_asks_for_setup() {
        let h = harness();
        handle_message(&h.state, &message("/generate Platform Engineer")).await;

        assert_eq!(h.messenger.texts(), vec![NEEDS_SETUP_REPLY.to_string()]);
        assert_eq!(h.model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_without_job_description_asks_for_it() {
        let h = harness();
        h.store.upsert("123456789", "my resume").await.unwrap();

        handle_message(&h.state, &message("/generate")).await;

        assert_eq!(
            h.messenger.texts(),
            vec![NEEDS_JOB_DESCRIPTION_REPLY.to_string()]
        );
        assert_eq!(h.model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_setup_then_generate_sends_two_documents() {
        let h = harness();
        handle_message(
            &h.state,
            &message("/setup I am a backend engineer with 5 years Go experience."),
        )
        .await;
        handle_message(
            &h.state,
            &message("/generate Senior Site Reliability Engineer, on-call, Kubernetes"),
        )
        .await;

        let texts = h.messenger.texts();
        assert_eq!(texts.len(), 3, "setup confirmation plus two documents");
        assert!(texts[1]
            .starts_with("Here's your tailored resume based on the provided job description:"));
        assert!(texts[1].ends_with("TAILORED RESUME"));
        assert!(
            texts[2].starts_with("Here's your cover letter tailored to the same job description:")
        );
        assert!(texts[2].ends_with("Dear hiring manager"));
        assert_eq!(h.model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_model_failure_sends_only_generic_error() {
        let h = harness_with(
            FakeModel::failing_cover_letter(),
            RecordingMessenger::default(),
        );
        h.store.upsert("123456789", "my resume").await.unwrap();

        handle_message(&h.state, &message("/generate Data Engineer")).await;

        assert_eq!(h.messenger.texts(), vec![GENERIC_ERROR_REPLY.to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_store_sends_generic_error() {
        let h = harness();
        std::fs::write(h.store.path(), "not json at all").unwrap();

        handle_message(&h.state, &message("/setup my resume")).await;
        handle_message(&h.state, &message("/generate SRE")).await;

        assert_eq!(
            h.messenger.texts(),
            vec![
                GENERIC_ERROR_REPLY.to_string(),
                GENERIC_ERROR_REPLY.to_string()
            ]
        );
        assert_eq!(h.model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_error_boundary_survives_failed_error_reply() {
        let h = harness_with(FakeModel::default(), RecordingMessenger::failing());

        // Neither the reply nor the error reply can be delivered; must not panic.
        handle_message(&h.state, &message("/hello")).await;

        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_ignores_commands_addressed_to_other_bots() {
        let h = harness();
        handle_message(&h.state, &message("/setup@SomeOtherBot my resume")).await;

        assert!(h.messenger.sent().is_empty());
        assert!(h.store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_case_command_is_handled() {
        let h = harness();
        handle_message(&h.state, &message("/Setup@tailorbot Kotlin developer")).await;

        assert_eq!(
            h.store.get("123456789").await.unwrap().as_deref(),
            Some("Kotlin developer")
        );
    }

    #[tokio::test]
    async fn test_ignores_plain_text_and_senderless_messages() {
        let h = harness();
        handle_message(&h.state, &message("just chatting")).await;

        let mut channel_post = message("/hello");
        channel_post.from = None;
        handle_message(&h.state, &channel_post).await;

        assert!(h.messenger.sent().is_empty());
    }
}

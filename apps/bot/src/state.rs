use std::sync::Arc;

use crate::generation::Generator;
use crate::store::ResumeStore;
use crate::telegram::Messenger;

/// Shared handles injected into every command handler.
/// Built once in `main` and cloned into each handler task.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub messenger: Arc<dyn Messenger>,
    pub generator: Generator,
    /// The bot's own `@username` (without the `@`), from `getMe` at startup.
    /// Commands addressed to any other bot are ignored.
    pub bot_username: String,
}

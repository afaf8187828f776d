//! Long-polling dispatcher.
//!
//! Pulls updates from Telegram and hands each message to the command layer on
//! its own task, so a slow `/generate` for one user never blocks another.

use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};
use tracing::{error, info};

use crate::commands::handle_message;
use crate::state::AppState;
use crate::telegram::{TelegramClient, Update};

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polls until `shutdown` resolves, then stops fetching and waits for every
/// in-flight handler so no accepted command goes unanswered.
pub async fn run_polling<S>(telegram: &TelegramClient, state: AppState, shutdown: S)
where
    S: Future<Output = ()>,
{
    info!("Starting Telegram long-polling loop...");
    tokio::pin!(shutdown);
    let mut tasks = JoinSet::new();
    let mut offset = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping polling loop");
                break;
            }
            result = telegram.get_updates(offset) => match result {
                Ok(updates) => offset = dispatch(&state, updates, offset, &mut tasks),
                Err(e) => {
                    error!("Failed to fetch Telegram updates: {}", e);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }
        reap(&mut tasks);
    }

    drain(&mut tasks).await;
}

/// Spawns a handler task per message and returns the next offset.
fn dispatch(
    state: &AppState,
    updates: Vec<Update>,
    mut offset: i64,
    tasks: &mut JoinSet<()>,
) -> i64 {
    for update in updates {
        offset = offset.max(update.update_id + 1);
        let Some(message) = update.message else {
            continue;
        };

        let state = state.clone();
        tasks.spawn(async move {
            handle_message(&state, &message).await;
        });
    }
    offset
}

/// Collects handlers that already finished without waiting on the rest.
fn reap(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        log_join(result);
    }
}

/// Waits for every remaining handler.
async fn drain(tasks: &mut JoinSet<()>) {
    if !tasks.is_empty() {
        info!("Waiting for {} in-flight command(s) to finish", tasks.len());
    }
    while let Some(result) = tasks.join_next().await {
        log_join(result);
    }
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!("Command handler task failed: {e}");
    }
}

//! Idle sweep
//!
//! Matches nobody touches any more get closed as a draw, which keeps
//! the wager where it started and frees the table.

use tokio::task::JoinHandle;

use crate::application::{FinishMatch, FinishMatchInput};
use crate::domain::match_runtime::MatchOutcome;
use crate::infrastructure::app_state::AppState;

/// Spawn the periodic sweep. Runs until the handle is dropped or
/// aborted.
pub fn spawn_idle_reaper(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(state.config.sweep_interval);
        // The first tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep_idle(&state).await;
        }
    })
}

/// One sweep pass. Returns how many matches were closed.
pub async fn sweep_idle(state: &AppState) -> usize {
    let mut swept = 0;
    for match_id in state.registry.ids().await {
        let entry = match state.registry.get(&match_id).await {
            Some(entry) => entry,
            None => continue,
        };
        if entry.idle_for() < state.config.idle_timeout {
            continue;
        }
        if entry.runtime.lock().await.is_finished() {
            continue;
        }
        tracing::info!(
            "match {} idle for {:?}, closing as a draw",
            match_id,
            entry.idle_for()
        );
        let finish = FinishMatch::new(state.clone())
            .execute(FinishMatchInput {
                match_id: match_id.clone(),
                outcome: MatchOutcome::Draw,
            })
            .await;
        match finish {
            Ok(_) => swept += 1,
            Err(e) => tracing::debug!("idle sweep skipped match {}: {}", match_id, e),
        }
    }
    swept
}

use crate::application::match_view::publish_refresh;
use crate::domain::match_runtime::{MatchOutcome, MatchRuntime};
use crate::domain::ports::{Ledger, Presenter};
use crate::domain::rules::rules_for;
use crate::domain::settlement::{wager_transfers, Transfer};
use crate::infrastructure::app_state::AppState;

/// Finish match input
pub struct FinishMatchInput {
    pub match_id: String,
    pub outcome: MatchOutcome,
}

/// Finish match output
#[derive(Debug)]
pub struct FinishMatchOutput {
    pub transfers: Vec<Transfer>,
}

/// Finish match use case, for endings decided outside the rules
/// engine: the idle sweep and administrative closes.
pub struct FinishMatch {
    state: AppState,
}

impl FinishMatch {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn execute(
        &self,
        input: FinishMatchInput,
    ) -> Result<FinishMatchOutput, FinishMatchError> {
        let entry = self
            .state
            .registry
            .get(&input.match_id)
            .await
            .ok_or(FinishMatchError::MatchNotFound)?;
        let mut runtime = entry.runtime.lock().await;
        runtime
            .finish(input.outcome)
            .map_err(|_| FinishMatchError::AlreadyFinished)?;

        let rules = rules_for(runtime.game);
        publish_refresh(&self.state, rules, &runtime, None).await;
        let transfers = conclude_match(&self.state, &runtime).await;
        Ok(FinishMatchOutput { transfers })
    }
}

/// Settle the wager and retire a finished match. Ledger failures are
/// logged and skipped; teardown always proceeds.
pub(crate) async fn conclude_match(state: &AppState, runtime: &MatchRuntime) -> Vec<Transfer> {
    let outcome = match runtime.outcome {
        Some(outcome) => outcome,
        None => {
            tracing::warn!("match {} concluded without an outcome", runtime.id);
            MatchOutcome::Draw
        }
    };

    let transfers = wager_transfers(&runtime.seats, runtime.bet, outcome);
    for transfer in &transfers {
        match state.ledger.adjust(&transfer.user_id, transfer.delta).await {
            Ok(balance) => tracing::debug!(
                "settled {} for {} (balance now {})",
                transfer.delta,
                transfer.user_id,
                balance
            ),
            Err(e) => tracing::warn!(
                "could not settle {} for {}: {}",
                transfer.delta,
                transfer.user_id,
                e
            ),
        }
    }

    let closing = closing_line(runtime, outcome, &transfers);
    if let Err(e) = state.presenter.announce(&runtime.id, &closing).await {
        tracing::debug!("closing announcement for {} not delivered: {}", runtime.id, e);
    }
    tracing::info!("match {} finished: {}", runtime.id, closing);

    schedule_teardown(state.clone(), runtime.id.clone());
    transfers
}

/// Abandon a corrupted match: close it as a draw, tell the room, tear
/// it down. No wagers move.
pub(crate) async fn abandon_match(state: &AppState, runtime: &mut MatchRuntime) {
    let _ = runtime.finish(MatchOutcome::Draw);
    let notice = "Match abandoned after an internal error. Stakes stay where they are";
    if let Err(e) = state.presenter.announce(&runtime.id, notice).await {
        tracing::debug!("abandon notice for {} not delivered: {}", runtime.id, e);
    }
    schedule_teardown(state.clone(), runtime.id.clone());
}

/// Drop the match from the registry once the grace period has passed.
pub(crate) fn schedule_teardown(state: AppState, match_id: String) {
    tokio::spawn(async move {
        tokio::time::sleep(state.config.teardown_grace).await;
        if state.registry.remove(&match_id).await.is_some() {
            tracing::info!("match {} torn down", match_id);
        }
    });
}

fn closing_line(runtime: &MatchRuntime, outcome: MatchOutcome, transfers: &[Transfer]) -> String {
    match outcome {
        MatchOutcome::Winner { seat } => {
            let winner = runtime.seats.get(seat);
            let name = winner.map(|s| s.display_name.as_str()).unwrap_or("?");
            let credit = transfers.iter().find(|t| t.delta > 0).map(|t| t.delta);
            match credit {
                Some(credit) => format!("{} wins and collects {}", name, credit),
                None if runtime.bet > 0 && winner.map(|s| s.is_bot()).unwrap_or(false) => {
                    format!("{} wins, the stakes go to the house", name)
                }
                None => format!("{} wins the match", name),
            }
        }
        MatchOutcome::TeamWin { team } => format!("Team {} wins", team + 1),
        MatchOutcome::Draw => "Match over, no winner. Stakes stay where they are".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FinishMatchError {
    #[error("Match not found")]
    MatchNotFound,
    #[error("Match already finished")]
    AlreadyFinished,
}

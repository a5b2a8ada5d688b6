//! View publishing shared by every use case, plus the read side.

use crate::domain::match_runtime::MatchRuntime;
use crate::domain::ports::Presenter;
use crate::domain::rules::{rules_for, GameRules};
use crate::domain::view::{Choice, Scoreboard, TableView};
use crate::infrastructure::app_state::AppState;

/// Push the shared table view, the scoreboard and every human seat's
/// private choice menu. Delivery failures are swallowed; a view the
/// room missed must never stall the match.
pub async fn publish_refresh(
    state: &AppState,
    rules: &dyn GameRules,
    runtime: &MatchRuntime,
    note: Option<&str>,
) {
    let view = rules.public_state(runtime);
    if let Err(e) = state.presenter.publish_table(&runtime.id, &view, note).await {
        tracing::debug!("table view for match {} not delivered: {}", runtime.id, e);
    }

    if let Some(board) = rules.scoreboard(runtime) {
        if let Err(e) = state.presenter.publish_scoreboard(&runtime.id, &board).await {
            tracing::debug!("scoreboard for match {} not delivered: {}", runtime.id, e);
        }
    }

    if runtime.is_finished() {
        return;
    }

    for (index, seat) in runtime.seats.iter().enumerate() {
        if seat.is_bot() {
            continue;
        }
        let choices = rules.player_choices(runtime, index);
        if choices.is_empty() {
            continue;
        }
        if let Err(e) = state
            .presenter
            .present_choices(&runtime.id, &seat.user_id, &choices)
            .await
        {
            tracing::debug!("choices for {} not delivered: {}", seat.user_id, e);
        }
    }
}

/// Get match view input
pub struct GetMatchViewInput {
    pub match_id: String,
    /// When set, include this user's private choice menu.
    pub user_id: Option<String>,
}

/// Get match view output
#[derive(Debug)]
pub struct GetMatchViewOutput {
    pub view: TableView,
    pub scoreboard: Option<Scoreboard>,
    pub choices: Vec<Choice>,
}

/// Get match view use case
pub struct GetMatchView {
    state: AppState,
}

impl GetMatchView {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn execute(
        &self,
        input: GetMatchViewInput,
    ) -> Result<GetMatchViewOutput, GetMatchViewError> {
        let entry = self
            .state
            .registry
            .get(&input.match_id)
            .await
            .ok_or(GetMatchViewError::MatchNotFound)?;
        let runtime = entry.runtime.lock().await;
        let rules = rules_for(runtime.game);

        let choices = match input.user_id.as_deref().and_then(|u| runtime.seat_of(u)) {
            Some(seat) if !runtime.is_finished() => rules.player_choices(&runtime, seat),
            _ => Vec::new(),
        };

        Ok(GetMatchViewOutput {
            view: rules.public_state(&runtime),
            scoreboard: rules.scoreboard(&runtime),
            choices,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetMatchViewError {
    #[error("Match not found")]
    MatchNotFound,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::rules::GameKind;
    use crate::domain::seat::Seat;
    use crate::infrastructure::app_state::RuntimeConfig;
    use crate::infrastructure::registry::MatchEntry;

    async fn war_state() -> (AppState, String) {
        let state = AppState::with_config(RuntimeConfig::instant());
        let rules = rules_for(GameKind::War);
        let seats = vec![Seat::human("u1", "Alice"), Seat::bot("b1", "Rusty")];
        let mut runtime = crate::domain::match_runtime::MatchRuntime::new(
            GameKind::War,
            seats,
            rules.deck_kind().build(Some(3)),
            0,
        );
        rules.init(&mut runtime).unwrap();
        runtime.begin();
        let match_id = runtime.id.clone();
        state
            .registry
            .insert(match_id.clone(), Arc::new(MatchEntry::new(runtime)))
            .await;
        (state, match_id)
    }

    #[tokio::test]
    async fn test_view_includes_private_choices_for_seated_user() {
        let (state, match_id) = war_state().await;
        let output = GetMatchView::new(state)
            .execute(GetMatchViewInput {
                match_id,
                user_id: Some("u1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(output.view.game, GameKind::War);
        assert!(!output.choices.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_match_is_an_error() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let err = GetMatchView::new(state)
            .execute(GetMatchViewInput {
                match_id: "nope".to_string(),
                user_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GetMatchViewError::MatchNotFound));
    }

    #[tokio::test]
    async fn test_publish_refresh_emits_table_and_choices() {
        let (state, match_id) = war_state().await;
        let mut events = state.presenter.subscribe();
        let entry = state.registry.get(&match_id).await.unwrap();
        let runtime = entry.runtime.lock().await;
        publish_refresh(&state, rules_for(runtime.game), &runtime, Some("flip!")).await;

        let table = events.recv().await.unwrap();
        assert_eq!(table.event_type, "table");
        let board = events.recv().await.unwrap();
        assert_eq!(board.event_type, "scoreboard");
        let choices = events.recv().await.unwrap();
        assert_eq!(choices.event_type, "choices");
        assert_eq!(choices.user_id.as_deref(), Some("u1"));
    }
}

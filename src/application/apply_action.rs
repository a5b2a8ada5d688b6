use crate::application::finish_match::{abandon_match, conclude_match};
use crate::application::match_view::publish_refresh;
use crate::domain::actions::Action;
use crate::domain::match_runtime::MatchRuntime;
use crate::domain::rules::{rules_for, GameRules, RulesError};
use crate::infrastructure::app_state::AppState;
use crate::infrastructure::registry::MatchEntry;

/// Apply action input
pub struct ApplyActionInput {
    pub match_id: String,
    pub user_id: String,
    pub action: Action,
}

/// Apply action output
#[derive(Debug)]
pub struct ApplyActionOutput {
    /// Public commentary for the action, when the engine produced one.
    pub note: Option<String>,
    pub finished: bool,
    /// True when a synthetic player can act next.
    pub bot_pending: bool,
}

/// Apply action use case. Every action in the room, human or
/// synthetic, goes through this one path.
pub struct ApplyAction {
    state: AppState,
}

impl ApplyAction {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn execute(
        &self,
        input: ApplyActionInput,
    ) -> Result<ApplyActionOutput, ApplyActionError> {
        let entry = self
            .state
            .registry
            .get(&input.match_id)
            .await
            .ok_or(ApplyActionError::MatchNotFound)?;
        let mut runtime = entry.runtime.lock().await;
        apply_locked(&self.state, &entry, &mut runtime, &input.user_id, &input.action).await
    }
}

/// Core dispatch, called with the match lock already held. The bot
/// driver comes in here directly so its decide-then-act step stays
/// atomic against human actions.
pub(crate) async fn apply_locked(
    state: &AppState,
    entry: &MatchEntry,
    runtime: &mut MatchRuntime,
    user_id: &str,
    action: &Action,
) -> Result<ApplyActionOutput, ApplyActionError> {
    if runtime.is_finished() {
        return Err(ApplyActionError::MatchOver);
    }

    let actor = runtime
        .seat_of(user_id)
        .ok_or(ApplyActionError::NotSeated)?;
    let rules = rules_for(runtime.game);

    // Turn gate. Response-class actions bypass the turn pointer but
    // need an open response window instead.
    if action.is_response() {
        if !rules.may_respond(runtime, actor) {
            return Err(ApplyActionError::OutOfTurn);
        }
    } else if actor != runtime.turn_index {
        return Err(ApplyActionError::OutOfTurn);
    }

    let applied = match rules.handle_action(runtime, actor, action) {
        Ok(applied) => applied,
        Err(RulesError::CorruptState(msg)) => {
            tracing::error!("match {} corrupted: {}", runtime.id, msg);
            abandon_match(state, runtime).await;
            return Err(ApplyActionError::Corrupt(msg));
        }
        Err(RulesError::OutOfTurn) => return Err(ApplyActionError::OutOfTurn),
        Err(RulesError::UnsupportedAction) => return Err(ApplyActionError::UnsupportedAction),
        Err(RulesError::IllegalMove(msg)) | Err(RulesError::NotImplemented(msg)) => {
            return Err(ApplyActionError::Rejected(msg))
        }
    };

    entry.touch();
    tracing::debug!(
        "match {}: {} played {} ({})",
        runtime.id,
        user_id,
        action.kind_str(),
        applied.note.as_deref().unwrap_or("ok")
    );

    publish_refresh(state, rules, runtime, applied.note.as_deref()).await;

    let finished = runtime.is_finished();
    if finished {
        conclude_match(state, runtime).await;
    }

    Ok(ApplyActionOutput {
        note: applied.note,
        finished,
        bot_pending: !finished && bot_pending(rules, runtime),
    })
}

/// True when a synthetic player can act right now: it holds the turn,
/// or a response window is open for one.
pub fn bot_pending(rules: &dyn GameRules, runtime: &MatchRuntime) -> bool {
    if runtime.is_finished() {
        return false;
    }
    if runtime.current_seat().is_bot() {
        return true;
    }
    runtime
        .seats
        .iter()
        .enumerate()
        .any(|(i, s)| s.is_bot() && rules.may_respond(runtime, i))
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyActionError {
    #[error("Match not found")]
    MatchNotFound,
    #[error("This match is already over")]
    MatchOver,
    #[error("You are not seated at this table")]
    NotSeated,
    #[error("Not your turn")]
    OutOfTurn,
    #[error("That action does not exist in this game")]
    UnsupportedAction,
    #[error("{0}")]
    Rejected(&'static str),
    #[error("Internal match error: {0}")]
    Corrupt(&'static str),
}

impl ApplyActionError {
    /// Rejections bounce back to the actor as a private notice; the
    /// match itself is untouched.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            ApplyActionError::Corrupt(_) | ApplyActionError::MatchNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::start_match::{StartMatch, StartMatchInput};
    use crate::domain::rules::GameKind;
    use crate::domain::seat::Seat;
    use crate::infrastructure::app_state::RuntimeConfig;

    async fn war_match(state: &AppState) -> String {
        StartMatch::new(state.clone())
            .execute(StartMatchInput {
                game: GameKind::War,
                seats: vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")],
                bet: 0,
                seed: Some(21),
            })
            .await
            .unwrap()
            .match_id
    }

    #[tokio::test]
    async fn test_current_player_can_act() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let match_id = war_match(&state).await;
        let output = ApplyAction::new(state)
            .execute(ApplyActionInput {
                match_id,
                user_id: "u1".to_string(),
                action: Action::PlayTop,
            })
            .await
            .unwrap();
        assert!(!output.finished);
    }

    #[tokio::test]
    async fn test_out_of_turn_action_is_rejected() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let match_id = war_match(&state).await;
        let err = ApplyAction::new(state)
            .execute(ApplyActionInput {
                match_id,
                user_id: "u2".to_string(),
                action: Action::PlayTop,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyActionError::OutOfTurn));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_stranger_cannot_act() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let match_id = war_match(&state).await;
        let err = ApplyAction::new(state)
            .execute(ApplyActionInput {
                match_id,
                user_id: "nobody".to_string(),
                action: Action::PlayTop,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyActionError::NotSeated));
    }

    #[tokio::test]
    async fn test_unknown_match_is_not_a_rejection() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let err = ApplyAction::new(state)
            .execute(ApplyActionInput {
                match_id: "gone".to_string(),
                user_id: "u1".to_string(),
                action: Action::PlayTop,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyActionError::MatchNotFound));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_wrong_family_action_is_rejected() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let match_id = war_match(&state).await;
        let err = ApplyAction::new(state)
            .execute(ApplyActionInput {
                match_id,
                user_id: "u1".to_string(),
                action: Action::DrawCard,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyActionError::UnsupportedAction));
    }

    #[tokio::test]
    async fn test_rejected_action_leaves_state_alone() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let match_id = war_match(&state).await;
        let entry = state.registry.get(&match_id).await.unwrap();
        let before = entry.runtime.lock().await.card_census();

        let _ = ApplyAction::new(state.clone())
            .execute(ApplyActionInput {
                match_id,
                user_id: "u2".to_string(),
                action: Action::PlayTop,
            })
            .await;

        let runtime = entry.runtime.lock().await;
        assert_eq!(runtime.card_census(), before);
        assert_eq!(runtime.turn_index, 0);
    }
}

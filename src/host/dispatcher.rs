//! Action dispatcher - the boundary between the room and the runtime
//!
//! Thin by intent: it parses inbound action tokens, forwards them down
//! the one dispatch path, turns rejections into private notices and
//! keeps the bot chain running. All rule knowledge stays below it.

use crate::application::{
    ApplyAction, ApplyActionError, ApplyActionInput, ApplyActionOutput, StartMatch,
    StartMatchError, StartMatchInput, StartMatchOutput,
};
use crate::domain::actions::Action;
use crate::domain::ports::Presenter;
use crate::host::bot_driver::schedule_bot_cycle;
use crate::infrastructure::app_state::AppState;

pub struct Dispatcher {
    state: AppState,
}

impl Dispatcher {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Open a match and, when a synthetic player holds the opening
    /// move, start its decision chain.
    pub async fn open(&self, input: StartMatchInput) -> Result<StartMatchOutput, StartMatchError> {
        let output = StartMatch::new(self.state.clone()).execute(input).await?;
        if output.bot_opens {
            schedule_bot_cycle(self.state.clone(), output.match_id.clone());
        }
        Ok(output)
    }

    /// Forward one inbound action. Rejections become a private notice
    /// to the actor; the shared view only moves on legal actions.
    pub async fn act(
        &self,
        match_id: &str,
        user_id: &str,
        action: Action,
    ) -> Result<ApplyActionOutput, ApplyActionError> {
        let result = ApplyAction::new(self.state.clone())
            .execute(ApplyActionInput {
                match_id: match_id.to_string(),
                user_id: user_id.to_string(),
                action,
            })
            .await;

        match &result {
            Ok(output) => {
                if output.bot_pending {
                    schedule_bot_cycle(self.state.clone(), match_id.to_string());
                }
            }
            Err(e) if e.is_rejection() => {
                if let Err(send) = self.state.presenter.notify(match_id, user_id, &e.to_string()).await
                {
                    tracing::debug!("rejection notice for {} not delivered: {}", user_id, send);
                }
            }
            Err(e) => {
                tracing::error!("action on match {} failed: {}", match_id, e);
            }
        }
        result
    }

    /// Parse a serialized action token and forward it.
    pub async fn act_token(
        &self,
        match_id: &str,
        user_id: &str,
        token: &str,
    ) -> Result<ApplyActionOutput, ApplyActionError> {
        match serde_json::from_str::<Action>(token) {
            Ok(action) => self.act(match_id, user_id, action).await,
            Err(e) => {
                tracing::debug!("unparseable action token from {}: {}", user_id, e);
                let err = ApplyActionError::UnsupportedAction;
                if let Err(send) = self
                    .state
                    .presenter
                    .notify(match_id, user_id, &err.to_string())
                    .await
                {
                    tracing::debug!("rejection notice for {} not delivered: {}", user_id, send);
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::rules::GameKind;
    use crate::domain::seat::Seat;
    use crate::infrastructure::app_state::RuntimeConfig;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(AppState::with_config(RuntimeConfig::instant()))
    }

    #[tokio::test]
    async fn test_rejection_notifies_the_actor() {
        let dispatcher = dispatcher();
        let output = dispatcher
            .open(StartMatchInput {
                game: GameKind::War,
                seats: vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")],
                bet: 0,
                seed: Some(31),
            })
            .await
            .unwrap();
        let mut events = dispatcher.state.presenter.subscribe();

        let err = dispatcher
            .act(&output.match_id, "u2", Action::PlayTop)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyActionError::OutOfTurn));

        let seen = tokio::time::timeout(Duration::from_secs(2), async move {
            loop {
                let event = events.recv().await.unwrap();
                if event.event_type == "notice" && event.user_id.as_deref() == Some("u2") {
                    assert_eq!(event.data["text"], serde_json::json!("Not your turn"));
                    break;
                }
            }
        })
        .await;
        assert!(seen.is_ok());
    }

    #[tokio::test]
    async fn test_token_path_applies_actions() {
        let dispatcher = dispatcher();
        let output = dispatcher
            .open(StartMatchInput {
                game: GameKind::War,
                seats: vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")],
                bet: 0,
                seed: Some(31),
            })
            .await
            .unwrap();

        let applied = dispatcher
            .act_token(&output.match_id, "u1", r#"{"type":"playTop"}"#)
            .await
            .unwrap();
        assert!(!applied.finished);
    }

    #[tokio::test]
    async fn test_garbage_token_is_bounced() {
        let dispatcher = dispatcher();
        let output = dispatcher
            .open(StartMatchInput {
                game: GameKind::War,
                seats: vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")],
                bet: 0,
                seed: Some(31),
            })
            .await
            .unwrap();

        let err = dispatcher
            .act_token(&output.match_id, "u1", "press the big red button")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyActionError::UnsupportedAction));
    }

    #[tokio::test]
    async fn test_human_action_restarts_the_bot_chain() {
        let dispatcher = dispatcher();
        let output = dispatcher
            .open(StartMatchInput {
                game: GameKind::War,
                seats: vec![Seat::human("u1", "Alice"), Seat::bot("b1", "Rusty")],
                bet: 0,
                seed: Some(31),
            })
            .await
            .unwrap();
        assert!(!output.bot_opens);

        let applied = dispatcher
            .act(&output.match_id, "u1", Action::PlayTop)
            .await
            .unwrap();
        assert!(applied.bot_pending);

        // The scheduled chain answers with the bot's card.
        let state = dispatcher.state.clone();
        let match_id = output.match_id.clone();
        let answered = tokio::time::timeout(Duration::from_secs(5), async move {
            loop {
                match state.registry.get(&match_id).await {
                    None => break,
                    Some(entry) => {
                        let runtime = entry.runtime.lock().await;
                        if runtime.is_finished()
                            || (runtime.turn_index == 0 && runtime.table.is_empty())
                        {
                            break;
                        }
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(answered.is_ok());
    }
}

//! Bot decision loop
//!
//! A guarded, self-rescheduling chain: each cycle waits the think
//! delay, claims the match's single cycle slot, applies exactly one
//! synthetic action through the normal dispatch path and, while bot
//! play stays pending, schedules the next cycle after the pace delay.

use crate::application::apply_locked;
use crate::domain::actions::Action;
use crate::domain::match_runtime::MatchRuntime;
use crate::domain::rules::{rules_for, GameRules};
use crate::infrastructure::app_state::AppState;

/// Kick off one decision cycle for a match. Safe to call whenever a
/// bot might be able to act; a cycle already in flight wins the slot.
pub fn schedule_bot_cycle(state: AppState, match_id: String) {
    tokio::spawn(async move {
        run_cycle(state, match_id).await;
    });
}

async fn run_cycle(state: AppState, match_id: String) {
    tokio::time::sleep(state.config.bot_think).await;

    let entry = match state.registry.get(&match_id).await {
        Some(entry) => entry,
        None => return,
    };
    if !entry.claim_bot_cycle() {
        return;
    }

    // Decide and act under one hold of the match lock, so the move a
    // bot settles on is applied against the exact state it saw.
    let applied = {
        let mut runtime = entry.runtime.lock().await;
        if runtime.is_finished() {
            None
        } else {
            let rules = rules_for(runtime.game);
            match pick_decision(rules, &runtime) {
                Some((bot_id, action)) => {
                    Some(apply_locked(&state, &entry, &mut runtime, &bot_id, &action).await)
                }
                None => None,
            }
        }
    };
    entry.release_bot_cycle();

    match applied {
        Some(Ok(output)) if output.bot_pending => {
            tokio::time::sleep(state.config.bot_pace).await;
            schedule_bot_cycle(state, match_id);
        }
        Some(Ok(_)) => {}
        Some(Err(e)) => {
            tracing::warn!("bot action on match {} failed: {}", match_id, e);
        }
        None => {}
    }
}

/// The next synthetic actor and its move: the turn holder first, then
/// any bot with an open response window.
fn pick_decision(rules: &dyn GameRules, runtime: &MatchRuntime) -> Option<(String, Action)> {
    let turn = runtime.turn_index;
    if runtime.seats[turn].is_bot() {
        if let Some(action) = rules.bot_decision(runtime, turn) {
            return Some((runtime.seats[turn].user_id.clone(), action));
        }
    }
    for (index, seat) in runtime.seats.iter().enumerate() {
        if index == turn || !seat.is_bot() {
            continue;
        }
        if rules.may_respond(runtime, index) {
            if let Some(action) = rules.bot_decision(runtime, index) {
                return Some((seat.user_id.clone(), action));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::{StartMatch, StartMatchInput};
    use crate::domain::rules::GameKind;
    use crate::domain::seat::Seat;
    use crate::infrastructure::app_state::RuntimeConfig;

    fn war_runtime(first: Seat, second: Seat) -> MatchRuntime {
        let rules = rules_for(GameKind::War);
        let mut runtime = MatchRuntime::new(
            GameKind::War,
            vec![first, second],
            rules.deck_kind().build(Some(2)),
            0,
        );
        rules.init(&mut runtime).unwrap();
        runtime.begin();
        runtime
    }

    #[test]
    fn test_pick_takes_the_turn_holding_bot() {
        let runtime = war_runtime(Seat::bot("b1", "Rusty"), Seat::bot("b2", "Clanker"));
        let (bot_id, action) = pick_decision(rules_for(GameKind::War), &runtime).unwrap();
        assert_eq!(bot_id, "b1");
        assert_eq!(action, Action::PlayTop);
    }

    #[test]
    fn test_pick_waits_for_a_human_turn_holder() {
        let runtime = war_runtime(Seat::human("u1", "Alice"), Seat::bot("b1", "Rusty"));
        assert!(pick_decision(rules_for(GameKind::War), &runtime).is_none());
    }

    #[tokio::test]
    async fn test_chain_plays_a_bot_match_to_the_end() {
        let state = AppState::with_config(RuntimeConfig::instant());
        let output = StartMatch::new(state.clone())
            .execute(StartMatchInput {
                game: GameKind::War,
                seats: vec![Seat::bot("b1", "Rusty"), Seat::bot("b2", "Clanker")],
                bet: 0,
                seed: Some(5),
            })
            .await
            .unwrap();
        assert!(output.bot_opens);
        schedule_bot_cycle(state.clone(), output.match_id.clone());

        let done = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                match state.registry.get(&output.match_id).await {
                    None => break,
                    Some(entry) => {
                        if entry.runtime.lock().await.is_finished() {
                            break;
                        }
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(done.is_ok());
    }
}

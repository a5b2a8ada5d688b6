//! Match Flow Integration Tests
//!
//! Drives whole matches through the dispatcher to check that the rules
//! engines, the bot chain and wager settlement hold together end to end.

use std::time::Duration;

use cardroom::application::StartMatchInput;
use cardroom::domain::actions::Action;
use cardroom::domain::match_runtime::MatchOutcome;
use cardroom::domain::rules::truco::TARGET_POINTS;
use cardroom::domain::rules::GameKind;
use cardroom::domain::seat::Seat;
use cardroom::host::Dispatcher;
use cardroom::infrastructure::app_state::{AppState, RuntimeConfig};

/// Helper to build a state with instant bots that keeps finished
/// matches around long enough to inspect them.
fn test_state() -> AppState {
    AppState::with_config(RuntimeConfig {
        bot_think: Duration::ZERO,
        bot_pace: Duration::ZERO,
        idle_timeout: Duration::from_secs(300),
        teardown_grace: Duration::from_secs(300),
        sweep_interval: Duration::from_secs(300),
    })
}

/// Helper to poll a match until it finishes, returning the outcome.
async fn wait_for_outcome(state: &AppState, match_id: &str, secs: u64) -> MatchOutcome {
    tokio::time::timeout(Duration::from_secs(secs), async {
        loop {
            let entry = state
                .registry
                .get(match_id)
                .await
                .expect("match disappeared before finishing");
            {
                let runtime = entry.runtime.lock().await;
                if let Some(outcome) = runtime.outcome {
                    return outcome;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("match did not finish in time")
}

// ============================================================================
// War Tests
// ============================================================================

#[tokio::test]
async fn test_war_human_vs_bot_runs_to_the_end() {
    let state = test_state();
    let dispatcher = Dispatcher::new(state.clone());
    let output = dispatcher
        .open(StartMatchInput {
            game: GameKind::War,
            seats: vec![Seat::human("u1", "Alice"), Seat::bot("b1", "Rusty")],
            bet: 30,
            seed: Some(42),
        })
        .await
        .unwrap();

    // Alice leads every trick; the scheduled chain answers for Rusty.
    let driven = tokio::time::timeout(Duration::from_secs(15), async {
        loop {
            let entry = state.registry.get(&output.match_id).await.unwrap();
            let (finished, my_turn) = {
                let runtime = entry.runtime.lock().await;
                (runtime.is_finished(), runtime.turn_index == 0)
            };
            if finished {
                break;
            }
            if my_turn {
                // A rejection here only means the match ended under us.
                let _ = dispatcher
                    .act(&output.match_id, "u1", Action::PlayTop)
                    .await;
            } else {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }
    })
    .await;
    assert!(driven.is_ok());

    let entry = state.registry.get(&output.match_id).await.unwrap();
    let runtime = entry.runtime.lock().await;
    assert_eq!(runtime.card_census(), 52);

    // A bot win burns Alice's stake; a human win collects nothing from
    // a bot; a draw moves nothing.
    match runtime.outcome.unwrap() {
        MatchOutcome::Winner { seat: 1 } => {
            assert_eq!(state.ledger.balances(), vec![("u1".to_string(), -30)]);
        }
        _ => assert!(state.ledger.balances().is_empty()),
    }
}

#[tokio::test]
async fn test_war_wager_settles_zero_sum_between_humans() {
    let state = test_state();
    state.ledger.credit("u1", 100);
    state.ledger.credit("u2", 100);
    let dispatcher = Dispatcher::new(state.clone());
    let output = dispatcher
        .open(StartMatchInput {
            game: GameKind::War,
            seats: vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")],
            bet: 40,
            seed: Some(2),
        })
        .await
        .unwrap();

    // No bots here; both seats are driven from the test.
    let outcome = tokio::time::timeout(Duration::from_secs(15), async {
        loop {
            let entry = state.registry.get(&output.match_id).await.unwrap();
            let user = {
                let runtime = entry.runtime.lock().await;
                if let Some(outcome) = runtime.outcome {
                    return outcome;
                }
                runtime.current_seat().user_id.clone()
            };
            dispatcher
                .act(&output.match_id, &user, Action::PlayTop)
                .await
                .unwrap();
        }
    })
    .await
    .unwrap();

    let balances = state.ledger.balances();
    let total: i64 = balances.iter().map(|(_, b)| *b).sum();
    assert_eq!(total, 200);
    match outcome {
        MatchOutcome::Winner { seat: 0 } => {
            assert!(balances.contains(&("u1".to_string(), 140)));
            assert!(balances.contains(&("u2".to_string(), 60)));
        }
        MatchOutcome::Winner { seat: _ } => {
            assert!(balances.contains(&("u1".to_string(), 60)));
            assert!(balances.contains(&("u2".to_string(), 140)));
        }
        _ => {
            assert!(balances.contains(&("u1".to_string(), 100)));
            assert!(balances.contains(&("u2".to_string(), 100)));
        }
    }
}

#[tokio::test]
async fn test_actions_publish_fresh_views() {
    let state = test_state();
    let dispatcher = Dispatcher::new(state.clone());
    let output = dispatcher
        .open(StartMatchInput {
            game: GameKind::War,
            seats: vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")],
            bet: 0,
            seed: Some(3),
        })
        .await
        .unwrap();
    let mut events = state.presenter.subscribe();

    dispatcher
        .act(&output.match_id, "u1", Action::PlayTop)
        .await
        .unwrap();

    // The refreshed table carries the flip as its commentary line.
    let seen = tokio::time::timeout(Duration::from_secs(2), async move {
        loop {
            let event = events.recv().await.unwrap();
            if event.event_type == "table"
                && event.data["note"]
                    .as_str()
                    .map(|n| n.contains("flips"))
                    .unwrap_or(false)
            {
                break;
            }
        }
    })
    .await;
    assert!(seen.is_ok());
}

// ============================================================================
// Uno Tests
// ============================================================================

#[tokio::test]
async fn test_uno_bots_play_unattended() {
    let state = test_state();
    let dispatcher = Dispatcher::new(state.clone());
    let output = dispatcher
        .open(StartMatchInput {
            game: GameKind::Uno,
            seats: vec![
                Seat::bot("b1", "Rusty"),
                Seat::bot("b2", "Clanker"),
                Seat::bot("b3", "Tin"),
            ],
            bet: 0,
            seed: Some(77),
        })
        .await
        .unwrap();
    assert!(output.bot_opens);

    let outcome = wait_for_outcome(&state, &output.match_id, 30).await;
    let entry = state.registry.get(&output.match_id).await.unwrap();
    let runtime = entry.runtime.lock().await;
    assert_eq!(runtime.card_census(), 108);
    match outcome {
        MatchOutcome::Winner { seat } => assert!(runtime.seats[seat].hand.is_empty()),
        // A table that runs itself completely dry is drawn.
        MatchOutcome::Draw => {}
        MatchOutcome::TeamWin { .. } => panic!("uno has no teams"),
    }
}

// ============================================================================
// Truco Tests
// ============================================================================

#[tokio::test]
async fn test_truco_bots_race_to_twelve() {
    let state = test_state();
    let dispatcher = Dispatcher::new(state.clone());
    let output = dispatcher
        .open(StartMatchInput {
            game: GameKind::Truco,
            seats: vec![Seat::bot("b1", "Rusty"), Seat::bot("b2", "Clanker")],
            bet: 0,
            seed: Some(5),
        })
        .await
        .unwrap();
    assert!(output.bot_opens);

    let outcome = wait_for_outcome(&state, &output.match_id, 30).await;
    let entry = state.registry.get(&output.match_id).await.unwrap();
    let runtime = entry.runtime.lock().await;
    assert_eq!(runtime.card_census(), 40);

    let MatchOutcome::Winner { seat } = outcome else {
        panic!("truco always produces a winner");
    };
    let points = runtime
        .meta
        .truco()
        .unwrap()
        .match_points
        .get(&runtime.seats[seat].user_id)
        .copied();
    assert_eq!(points, Some(TARGET_POINTS));
}

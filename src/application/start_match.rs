use std::collections::HashSet;
use std::sync::Arc;

use crate::application::apply_action::bot_pending;
use crate::application::match_view::publish_refresh;
use crate::domain::match_runtime::MatchRuntime;
use crate::domain::ports::Presenter;
use crate::domain::rules::{rules_for, GameKind, RulesError};
use crate::domain::seat::Seat;
use crate::infrastructure::app_state::AppState;
use crate::infrastructure::registry::MatchEntry;

/// Start match input
pub struct StartMatchInput {
    pub game: GameKind,
    /// Seats in table order; hands must be empty, dealing is the
    /// engine's job.
    pub seats: Vec<Seat>,
    /// Stake per human participant. Zero plays for nothing.
    pub bet: u64,
    /// Fixed shuffle seed, for reproducible deals.
    pub seed: Option<u64>,
}

/// Start match output
#[derive(Debug)]
pub struct StartMatchOutput {
    pub match_id: String,
    /// True when a synthetic player holds the opening move.
    pub bot_opens: bool,
}

/// Start match use case
pub struct StartMatch {
    state: AppState,
}

impl StartMatch {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn execute(
        &self,
        input: StartMatchInput,
    ) -> Result<StartMatchOutput, StartMatchError> {
        let rules = rules_for(input.game);

        // Check seat count against the game's limits
        let limits = rules.seat_limits();
        if !limits.allows(input.seats.len()) {
            return Err(StartMatchError::SeatCount {
                min: limits.min,
                max: limits.max,
                got: input.seats.len(),
            });
        }

        // Check every user sits only once
        let mut seen = HashSet::new();
        for seat in &input.seats {
            if !seen.insert(seat.user_id.clone()) {
                return Err(StartMatchError::DuplicateSeat(seat.user_id.clone()));
            }
        }

        // Team games split unassigned seats alternately
        let mut seats = input.seats;
        if rules.team_based() {
            for (index, seat) in seats.iter_mut().enumerate() {
                if seat.team.is_none() {
                    seat.team = Some((index % 2) as u8);
                }
            }
        }

        // Build the deck and deal
        let deck = rules.deck_kind().build(input.seed);
        let mut runtime = MatchRuntime::new(input.game, seats, deck, input.bet);
        match rules.init(&mut runtime) {
            Ok(()) => {}
            Err(RulesError::NotImplemented(msg)) => {
                return Err(StartMatchError::GameUnavailable(msg))
            }
            Err(e) => return Err(StartMatchError::Rules(e)),
        }
        runtime.begin();

        let match_id = runtime.id.clone();
        let bot_opens = bot_pending(rules, &runtime);

        let names: Vec<&str> = runtime
            .seats
            .iter()
            .map(|s| s.display_name.as_str())
            .collect();
        let opener = if input.bet > 0 {
            format!(
                "{} match open: {} ({} per head)",
                input.game.as_str(),
                names.join(" vs "),
                input.bet
            )
        } else {
            format!("{} match open: {}", input.game.as_str(), names.join(" vs "))
        };
        tracing::info!(
            "match {} started: {} with {} seats, bet {}",
            match_id,
            input.game.as_str(),
            runtime.seat_count(),
            input.bet
        );

        // Register before the room hears anything: a subscriber reacting
        // to the announcement must find the match. The opening publishes
        // happen under the match lock, so no action lands before them.
        let entry = Arc::new(MatchEntry::new(runtime));
        self.state
            .registry
            .insert(match_id.clone(), entry.clone())
            .await;
        {
            let runtime = entry.runtime.lock().await;
            if let Err(e) = self.state.presenter.announce(&match_id, &opener).await {
                tracing::debug!("opening announcement for {} not delivered: {}", match_id, e);
            }
            publish_refresh(&self.state, rules, &runtime, None).await;
        }

        Ok(StartMatchOutput {
            match_id,
            bot_opens,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartMatchError {
    #[error("Seat count {got} outside the allowed range {min}-{max}")]
    SeatCount {
        min: usize,
        max: usize,
        got: usize,
    },
    #[error("User {0} is seated twice")]
    DuplicateSeat(String),
    #[error("Game not available: {0}")]
    GameUnavailable(&'static str),
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),
}

//! MatchRuntime - the generic container for one running match
//!
//! Holds the deck, the table, the seats and the turn pointer; every
//! game-specific decision is delegated to a rules engine.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::Card;
use crate::domain::meta::MatchMeta;
use crate::domain::rules::{GameKind, RulesError};
use crate::domain::seat::Seat;

/// Match lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    Setup,
    Playing,
    Finished,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::Setup => "setup",
            MatchPhase::Playing => "playing",
            MatchPhase::Finished => "finished",
        }
    }
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOutcome {
    Winner { seat: usize },
    TeamWin { team: u8 },
    Draw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRuntime {
    pub id: String,
    pub game: GameKind,
    pub seats: Vec<Seat>,
    /// Cards left to draw; some games repurpose it as the spent pile.
    pub deck: Vec<Card>,
    /// Cards face up on the table, in play order.
    pub table: Vec<Card>,
    pub turn_index: usize,
    pub meta: MatchMeta,
    /// Stake per human participant.
    pub bet: u64,
    pub phase: MatchPhase,
    pub outcome: Option<MatchOutcome>,
    pub created_at: i64,
}

impl MatchRuntime {
    pub fn new(game: GameKind, seats: Vec<Seat>, deck: Vec<Card>, bet: u64) -> Self {
        MatchRuntime {
            id: Uuid::new_v4().to_string(),
            game,
            seats,
            deck,
            table: Vec::new(),
            turn_index: 0,
            meta: MatchMeta::initial(game),
            bet,
            phase: MatchPhase::Setup,
            outcome: None,
            created_at: Utc::now().timestamp(),
        }
    }

    #[inline]
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    #[inline]
    pub fn current_seat(&self) -> &Seat {
        &self.seats[self.turn_index]
    }

    /// Seat index for a user id, if seated here.
    pub fn seat_of(&self, user_id: &str) -> Option<usize> {
        self.seats.iter().position(|s| s.user_id == user_id)
    }

    /// Hand over the turn to the next seat.
    #[inline]
    pub fn next_turn(&mut self) {
        self.advance(1);
    }

    /// Move the turn pointer by a signed step, wrapping in either
    /// direction (Uno plays backwards half the time).
    pub fn advance(&mut self, step: i64) {
        let seats = self.seats.len() as i64;
        self.turn_index = (self.turn_index as i64 + step).rem_euclid(seats) as usize;
    }

    pub fn begin(&mut self) {
        self.phase = MatchPhase::Playing;
    }

    /// Record the terminal outcome. A match finishes exactly once; a
    /// second finish is corrupt state.
    pub fn finish(&mut self, outcome: MatchOutcome) -> Result<(), RulesError> {
        if self.phase == MatchPhase::Finished {
            return Err(RulesError::CorruptState("match already finished"));
        }
        self.phase = MatchPhase::Finished;
        self.outcome = Some(outcome);
        Ok(())
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    /// Total cards across deck, table and hands. Constant for the whole
    /// match in every game.
    pub fn card_census(&self) -> usize {
        self.deck.len()
            + self.table.len()
            + self.seats.iter().map(|s| s.hand.len()).sum::<usize>()
    }
}

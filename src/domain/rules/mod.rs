//! GameRules - the contract every game in the room implements
//!
//! One stateless engine per game; the match runtime and the dispatcher
//! call through this trait and never branch on the game itself.

pub mod poker;
pub mod truco;
pub mod uno;
pub mod war;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::actions::Action;
use crate::domain::deck::DeckKind;
use crate::domain::match_runtime::{MatchOutcome, MatchRuntime};
use crate::domain::view::{Choice, Scoreboard, TableView};

/// Games the room can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameKind {
    War,
    Uno,
    Truco,
    Poker,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::War,
        GameKind::Uno,
        GameKind::Truco,
        GameKind::Poker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::War => "war",
            GameKind::Uno => "uno",
            GameKind::Truco => "truco",
            GameKind::Poker => "poker",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "war" => Some(GameKind::War),
            "uno" => Some(GameKind::Uno),
            "truco" => Some(GameKind::Truco),
            "poker" => Some(GameKind::Poker),
            _ => None,
        }
    }
}

/// How many seats a game accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLimits {
    pub min: usize,
    pub max: usize,
}

impl SeatLimits {
    pub const fn exactly(n: usize) -> Self {
        SeatLimits { min: n, max: n }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        SeatLimits { min, max }
    }

    #[inline]
    pub fn allows(&self, seats: usize) -> bool {
        seats >= self.min && seats <= self.max
    }
}

/// Why a rules engine refused an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("not your turn")]
    OutOfTurn,
    #[error("illegal move: {0}")]
    IllegalMove(&'static str),
    #[error("that action does not exist in this game")]
    UnsupportedAction,
    #[error("not available yet: {0}")]
    NotImplemented(&'static str),
    #[error("corrupt match state: {0}")]
    CorruptState(&'static str),
}

impl RulesError {
    /// Fatal errors abandon the match; the rest only bounce the action.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, RulesError::CorruptState(_))
    }
}

/// What a handled action produced: an optional public commentary line
/// plus, when the match just ended, its outcome.
#[derive(Debug, Clone, Default)]
pub struct Applied {
    pub note: Option<String>,
    pub outcome: Option<MatchOutcome>,
}

impl Applied {
    pub fn ok() -> Self {
        Applied::default()
    }

    pub fn note(text: impl Into<String>) -> Self {
        Applied {
            note: Some(text.into()),
            outcome: None,
        }
    }

    pub fn finished(outcome: MatchOutcome, text: impl Into<String>) -> Self {
        Applied {
            note: Some(text.into()),
            outcome: Some(outcome),
        }
    }
}

pub trait GameRules: Send + Sync {
    fn kind(&self) -> GameKind;

    fn seat_limits(&self) -> SeatLimits;

    fn deck_kind(&self) -> DeckKind;

    /// Team games settle wagers by team rather than head to head.
    fn team_based(&self) -> bool {
        false
    }

    /// Deal the opening state. The runtime arrives with a built deck,
    /// empty hands and the turn on seat 0.
    fn init(&self, runtime: &mut MatchRuntime) -> Result<(), RulesError>;

    /// Apply one action for the seat at `actor`. The dispatcher has
    /// already gated the turn for non-response actions.
    fn handle_action(
        &self,
        runtime: &mut MatchRuntime,
        actor: usize,
        action: &Action,
    ) -> Result<Applied, RulesError>;

    /// Public table projection. Pure; safe to call at any time.
    fn public_state(&self, runtime: &MatchRuntime) -> TableView;

    /// Buttons to offer one player right now.
    fn player_choices(&self, runtime: &MatchRuntime, actor: usize) -> Vec<Choice> {
        let _ = (runtime, actor);
        Vec::new()
    }

    fn scoreboard(&self, runtime: &MatchRuntime) -> Option<Scoreboard> {
        let _ = runtime;
        None
    }

    /// Next move for a synthetic player, if it has one.
    fn bot_decision(&self, runtime: &MatchRuntime, actor: usize) -> Option<Action> {
        let _ = (runtime, actor);
        None
    }

    /// Whether `actor` may submit a response-class action right now.
    fn may_respond(&self, runtime: &MatchRuntime, actor: usize) -> bool {
        let _ = (runtime, actor);
        false
    }
}

/// Look up the engine for a game. Engines are stateless statics.
pub fn rules_for(kind: GameKind) -> &'static dyn GameRules {
    match kind {
        GameKind::War => &war::WarRules,
        GameKind::Uno => &uno::UnoRules,
        GameKind::Truco => &truco::TrucoRules,
        GameKind::Poker => &poker::PokerRules,
    }
}

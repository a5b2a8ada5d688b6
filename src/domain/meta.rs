//! MatchMeta - per-game scratch state carried opaquely by the runtime
//!
//! A tagged union instead of a loose JSON blob: each rules engine reaches
//! its own variant through checked accessors, and a mismatch is corrupt
//! state rather than a silent default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::domain::cards::{SpanishCard, UnoColor};
use crate::domain::rules::{GameKind, RulesError};

/// War scratch state: trick wins per player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarMeta {
    pub wins: HashMap<String, u8>,
}

/// Uno scratch state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnoMeta {
    /// +1 clockwise, -1 counter-clockwise.
    pub direction: i8,
    /// Color forced by the last wild, cleared by the next colored play.
    pub forced_color: Option<UnoColor>,
    /// Accumulated draw-two / draw-four penalty waiting for a victim.
    pub pending_draw: u8,
    /// Seat that played a wild and still owes the color choice.
    pub awaiting_color: Option<usize>,
    /// The current seat already took its one draw this turn.
    pub drawn_this_turn: bool,
    /// Consecutive turns passed with nothing left to draw. A full lap
    /// of these means the table is stuck and the match is drawn.
    pub dry_passes: u8,
}

impl UnoMeta {
    pub fn new() -> Self {
        UnoMeta {
            direction: 1,
            forced_color: None,
            pending_draw: 0,
            awaiting_color: None,
            drawn_this_turn: false,
            dry_passes: 0,
        }
    }
}

impl Default for UnoMeta {
    fn default() -> Self {
        UnoMeta::new()
    }
}

/// Truco scratch state: match points plus the current hand's trick
/// bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrucoMeta {
    pub match_points: HashMap<String, u8>,
    /// Seat that led the current hand.
    pub hand_starter: usize,
    /// Seat that leads the current trick.
    pub trick_leader: usize,
    /// Cards on the table for the trick in play, in play order.
    pub trick_plays: SmallVec<[(usize, SpanishCard); 2]>,
    /// Winner per resolved trick this hand; None marks a parda.
    pub trick_results: SmallVec<[Option<usize>; 3]>,
}

impl TrucoMeta {
    pub fn new(hand_starter: usize) -> Self {
        TrucoMeta {
            match_points: HashMap::new(),
            hand_starter,
            trick_leader: hand_starter,
            trick_plays: SmallVec::new(),
            trick_results: SmallVec::new(),
        }
    }
}

/// Placeholder for the poker family; nothing to track until it lands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokerMeta {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMeta {
    War(WarMeta),
    Uno(UnoMeta),
    Truco(TrucoMeta),
    Poker(PokerMeta),
}

impl MatchMeta {
    /// The empty variant a fresh match of `game` starts with; `init`
    /// fills in the specifics.
    pub fn initial(game: GameKind) -> Self {
        match game {
            GameKind::War => MatchMeta::War(WarMeta::default()),
            GameKind::Uno => MatchMeta::Uno(UnoMeta::new()),
            GameKind::Truco => MatchMeta::Truco(TrucoMeta::new(0)),
            GameKind::Poker => MatchMeta::Poker(PokerMeta::default()),
        }
    }

    pub fn war(&self) -> Result<&WarMeta, RulesError> {
        match self {
            MatchMeta::War(m) => Ok(m),
            _ => Err(RulesError::CorruptState("war meta missing")),
        }
    }

    pub fn war_mut(&mut self) -> Result<&mut WarMeta, RulesError> {
        match self {
            MatchMeta::War(m) => Ok(m),
            _ => Err(RulesError::CorruptState("war meta missing")),
        }
    }

    pub fn uno(&self) -> Result<&UnoMeta, RulesError> {
        match self {
            MatchMeta::Uno(m) => Ok(m),
            _ => Err(RulesError::CorruptState("uno meta missing")),
        }
    }

    pub fn uno_mut(&mut self) -> Result<&mut UnoMeta, RulesError> {
        match self {
            MatchMeta::Uno(m) => Ok(m),
            _ => Err(RulesError::CorruptState("uno meta missing")),
        }
    }

    pub fn truco(&self) -> Result<&TrucoMeta, RulesError> {
        match self {
            MatchMeta::Truco(m) => Ok(m),
            _ => Err(RulesError::CorruptState("truco meta missing")),
        }
    }

    pub fn truco_mut(&mut self) -> Result<&mut TrucoMeta, RulesError> {
        match self {
            MatchMeta::Truco(m) => Ok(m),
            _ => Err(RulesError::CorruptState("truco meta missing")),
        }
    }
}

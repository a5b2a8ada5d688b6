//! Poker - declared seat at the table, not yet dealt
//!
//! The engine registers its limits and deck so lobby surfaces can list
//! it, but a poker match cannot start until the betting rounds land.
//! The `Respond` action class exists for this family's escalations.

use serde_json::json;

use crate::domain::actions::Action;
use crate::domain::deck::DeckKind;
use crate::domain::match_runtime::MatchRuntime;
use crate::domain::rules::{Applied, GameKind, GameRules, RulesError, SeatLimits};
use crate::domain::view::TableView;

pub struct PokerRules;

impl GameRules for PokerRules {
    fn kind(&self) -> GameKind {
        GameKind::Poker
    }

    fn seat_limits(&self) -> SeatLimits {
        SeatLimits::between(2, 8)
    }

    fn deck_kind(&self) -> DeckKind {
        DeckKind::French
    }

    fn init(&self, _runtime: &mut MatchRuntime) -> Result<(), RulesError> {
        Err(RulesError::NotImplemented("poker tables are not open yet"))
    }

    fn handle_action(
        &self,
        _runtime: &mut MatchRuntime,
        _actor: usize,
        _action: &Action,
    ) -> Result<Applied, RulesError> {
        Err(RulesError::NotImplemented("poker tables are not open yet"))
    }

    fn public_state(&self, runtime: &MatchRuntime) -> TableView {
        TableView {
            game: GameKind::Poker,
            headline: "Poker - tables are not open yet".to_string(),
            table: Vec::new(),
            turn: None,
            detail: json!({ "seats": runtime.seat_count() }),
        }
    }
}

//! War - simplest game in the room, two players flipping top cards
//!
//! Tricks go to the higher rank, ties burn both cards, first to five
//! tricks takes the match.

use serde_json::json;
use std::cmp::Ordering;

use crate::domain::actions::Action;
use crate::domain::cards::Card;
use crate::domain::deck::DeckKind;
use crate::domain::match_runtime::{MatchOutcome, MatchPhase, MatchRuntime};
use crate::domain::rules::{Applied, GameKind, GameRules, RulesError, SeatLimits};
use crate::domain::view::{Choice, Scoreboard, TableView};

/// Trick wins needed to take the match.
pub const TARGET_WINS: u8 = 5;

pub struct WarRules;

impl WarRules {
    fn play_top(&self, runtime: &mut MatchRuntime, actor: usize) -> Result<Applied, RulesError> {
        let actor_name = runtime.seats[actor].display_name.clone();
        let card = runtime.seats[actor]
            .hand
            .pop()
            .ok_or(RulesError::IllegalMove("no cards left to flip"))?;
        runtime.table.push(card);

        if runtime.table.len() < 2 {
            runtime.next_turn();
            return Ok(Applied::note(format!(
                "{} flips {}",
                actor_name,
                card.label()
            )));
        }

        let opponent = 1 - actor;
        let lead = runtime.table[0]
            .french()
            .ok_or(RulesError::CorruptState("non-french card on war table"))?;
        let reply = runtime.table[1]
            .french()
            .ok_or(RulesError::CorruptState("non-french card on war table"))?;

        // Lead card came from the other seat, reply from the actor.
        let trick_winner = match lead.rank.cmp(&reply.rank) {
            Ordering::Greater => Some(opponent),
            Ordering::Less => Some(actor),
            Ordering::Equal => None,
        };

        // Spent cards pile up in the deck container so nothing leaves
        // the match.
        let spent: Vec<Card> = runtime.table.drain(..).collect();
        runtime.deck.extend(spent);

        match trick_winner {
            Some(winner) => {
                let winner_id = runtime.seats[winner].user_id.clone();
                let winner_name = runtime.seats[winner].display_name.clone();
                let count = {
                    let meta = runtime.meta.war_mut()?;
                    let entry = meta.wins.entry(winner_id).or_insert(0);
                    *entry += 1;
                    *entry
                };

                if count >= TARGET_WINS {
                    runtime.finish(MatchOutcome::Winner { seat: winner })?;
                    return Ok(Applied::finished(
                        MatchOutcome::Winner { seat: winner },
                        format!("{} takes the fifth trick and wins the match", winner_name),
                    ));
                }

                if self.hands_exhausted(runtime) {
                    return self.resolve_exhaustion(runtime);
                }

                runtime.next_turn();
                Ok(Applied::note(format!(
                    "{} takes the trick, {} over {} ({} of {})",
                    winner_name,
                    if winner == actor { reply.label() } else { lead.label() },
                    if winner == actor { lead.label() } else { reply.label() },
                    count,
                    TARGET_WINS
                )))
            }
            None => {
                if self.hands_exhausted(runtime) {
                    return self.resolve_exhaustion(runtime);
                }
                runtime.next_turn();
                Ok(Applied::note(format!(
                    "Tie at {} - both cards burn",
                    lead.rank.symbol()
                )))
            }
        }
    }

    fn hands_exhausted(&self, runtime: &MatchRuntime) -> bool {
        runtime.seats.iter().all(|s| s.hand.is_empty())
    }

    /// Both hands ran dry before anyone hit the target: the higher trick
    /// count wins, equal counts draw.
    fn resolve_exhaustion(&self, runtime: &mut MatchRuntime) -> Result<Applied, RulesError> {
        let (first, second) = {
            let meta = runtime.meta.war()?;
            (
                *meta.wins.get(&runtime.seats[0].user_id).unwrap_or(&0),
                *meta.wins.get(&runtime.seats[1].user_id).unwrap_or(&0),
            )
        };
        let outcome = match first.cmp(&second) {
            Ordering::Greater => MatchOutcome::Winner { seat: 0 },
            Ordering::Less => MatchOutcome::Winner { seat: 1 },
            Ordering::Equal => MatchOutcome::Draw,
        };
        runtime.finish(outcome)?;
        let text = match outcome {
            MatchOutcome::Winner { seat } => format!(
                "Cards are out - {} wins {} tricks to {}",
                runtime.seats[seat].display_name,
                first.max(second),
                first.min(second)
            ),
            _ => format!("Cards are out - drawn at {} tricks apiece", first),
        };
        Ok(Applied::finished(outcome, text))
    }
}

impl GameRules for WarRules {
    fn kind(&self) -> GameKind {
        GameKind::War
    }

    fn seat_limits(&self) -> SeatLimits {
        SeatLimits::exactly(2)
    }

    fn deck_kind(&self) -> DeckKind {
        DeckKind::French
    }

    fn init(&self, runtime: &mut MatchRuntime) -> Result<(), RulesError> {
        let mut next = 0usize;
        while let Some(card) = runtime.deck.pop() {
            runtime.seats[next].hand.push(card);
            next = (next + 1) % runtime.seats.len();
        }
        Ok(())
    }

    fn handle_action(
        &self,
        runtime: &mut MatchRuntime,
        actor: usize,
        action: &Action,
    ) -> Result<Applied, RulesError> {
        match action {
            Action::PlayTop => self.play_top(runtime, actor),
            _ => Err(RulesError::UnsupportedAction),
        }
    }

    fn public_state(&self, runtime: &MatchRuntime) -> TableView {
        let wins = runtime
            .meta
            .war()
            .map(|m| m.wins.clone())
            .unwrap_or_default();
        let seats: Vec<serde_json::Value> = runtime
            .seats
            .iter()
            .map(|s| {
                json!({
                    "name": s.display_name,
                    "wins": wins.get(&s.user_id).copied().unwrap_or(0),
                    "cardsLeft": s.hand.len(),
                })
            })
            .collect();
        let headline = if runtime.phase == MatchPhase::Finished {
            "War - match over".to_string()
        } else {
            format!("War - {} to flip", runtime.current_seat().display_name)
        };
        TableView {
            game: GameKind::War,
            headline,
            table: runtime.table.iter().map(|c| c.label()).collect(),
            turn: (runtime.phase != MatchPhase::Finished)
                .then(|| runtime.current_seat().display_name.clone()),
            detail: json!({
                "seats": seats,
                "target": TARGET_WINS,
                "spentPile": runtime.deck.len(),
            }),
        }
    }

    fn player_choices(&self, runtime: &MatchRuntime, actor: usize) -> Vec<Choice> {
        if runtime.phase != MatchPhase::Playing
            || actor != runtime.turn_index
            || runtime.seats[actor].hand.is_empty()
        {
            return Vec::new();
        }
        vec![Choice::new(Action::PlayTop, "Flip your top card")]
    }

    fn scoreboard(&self, runtime: &MatchRuntime) -> Option<Scoreboard> {
        let meta = runtime.meta.war().ok()?;
        let mut board = Scoreboard::new(format!("War - first to {}", TARGET_WINS));
        for seat in &runtime.seats {
            let wins = meta.wins.get(&seat.user_id).copied().unwrap_or(0);
            board = board.line(seat.display_name.clone(), wins as i32);
        }
        Some(board)
    }

    fn bot_decision(&self, runtime: &MatchRuntime, actor: usize) -> Option<Action> {
        if runtime.phase == MatchPhase::Playing && runtime.turn_index == actor {
            Some(Action::PlayTop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::{FrenchCard, FrenchRank, FrenchSuit};
    use crate::domain::seat::Seat;

    fn french(rank: FrenchRank, suit: FrenchSuit) -> Card {
        Card::French(FrenchCard { suit, rank })
    }

    fn fresh_match(seed: u64) -> MatchRuntime {
        let seats = vec![Seat::human("u1", "Alice"), Seat::human("u2", "Bob")];
        let mut runtime =
            MatchRuntime::new(GameKind::War, seats, DeckKind::French.build(Some(seed)), 0);
        WarRules.init(&mut runtime).unwrap();
        runtime.begin();
        runtime
    }

    /// Empty both hands and plant one specific card on each.
    fn rig_hands(runtime: &mut MatchRuntime, first: Card, second: Card) {
        runtime.seats[0].hand.clear();
        runtime.seats[1].hand.clear();
        runtime.seats[0].hand.push(first);
        runtime.seats[1].hand.push(second);
    }

    #[test]
    fn test_deal_splits_deck_evenly() {
        let runtime = fresh_match(1);
        assert_eq!(runtime.seats[0].hand.len(), 26);
        assert_eq!(runtime.seats[1].hand.len(), 26);
        assert!(runtime.deck.is_empty());
        assert_eq!(runtime.card_census(), 52);
    }

    #[test]
    fn test_first_flip_waits_for_reply() {
        let mut runtime = fresh_match(1);
        let applied = WarRules
            .handle_action(&mut runtime, 0, &Action::PlayTop)
            .unwrap();
        assert!(applied.outcome.is_none());
        assert_eq!(runtime.table.len(), 1);
        assert_eq!(runtime.turn_index, 1);
        assert!(runtime.meta.war().unwrap().wins.is_empty());
    }

    #[test]
    fn test_trick_goes_to_higher_rank() {
        let mut runtime = fresh_match(1);
        rig_hands(
            &mut runtime,
            french(FrenchRank::King, FrenchSuit::Spades),
            french(FrenchRank::Two, FrenchSuit::Hearts),
        );
        WarRules
            .handle_action(&mut runtime, 0, &Action::PlayTop)
            .unwrap();
        // Bob's reply loses; with hands now empty the match resolves.
        let applied = WarRules
            .handle_action(&mut runtime, 1, &Action::PlayTop)
            .unwrap();
        assert_eq!(
            runtime.meta.war().unwrap().wins.get("u1").copied(),
            Some(1)
        );
        assert!(runtime.table.is_empty());
        assert_eq!(runtime.deck.len(), 2);
        assert_eq!(applied.outcome, Some(MatchOutcome::Winner { seat: 0 }));
    }

    #[test]
    fn test_tie_scores_nobody() {
        let mut runtime = fresh_match(1);
        rig_hands(
            &mut runtime,
            french(FrenchRank::Nine, FrenchSuit::Clubs),
            french(FrenchRank::Nine, FrenchSuit::Diamonds),
        );
        WarRules
            .handle_action(&mut runtime, 0, &Action::PlayTop)
            .unwrap();
        let applied = WarRules
            .handle_action(&mut runtime, 1, &Action::PlayTop)
            .unwrap();
        assert!(runtime.meta.war().unwrap().wins.is_empty());
        assert_eq!(runtime.deck.len(), 2);
        // Equal counts at exhaustion draw the match.
        assert_eq!(applied.outcome, Some(MatchOutcome::Draw));
    }

    #[test]
    fn test_fifth_trick_ends_the_match() {
        let mut runtime = fresh_match(1);
        runtime
            .meta
            .war_mut()
            .unwrap()
            .wins
            .insert("u2".to_string(), 4);
        rig_hands(
            &mut runtime,
            french(FrenchRank::Three, FrenchSuit::Clubs),
            french(FrenchRank::Ace, FrenchSuit::Clubs),
        );
        // Leave Bob a second card so exhaustion is not what ends it.
        runtime.seats[1]
            .hand
            .insert(0, french(FrenchRank::Four, FrenchSuit::Hearts));
        WarRules
            .handle_action(&mut runtime, 0, &Action::PlayTop)
            .unwrap();
        let applied = WarRules
            .handle_action(&mut runtime, 1, &Action::PlayTop)
            .unwrap();
        assert_eq!(applied.outcome, Some(MatchOutcome::Winner { seat: 1 }));
        assert!(runtime.is_finished());
        assert_eq!(runtime.outcome, Some(MatchOutcome::Winner { seat: 1 }));
    }

    #[test]
    fn test_exhaustion_prefers_higher_count() {
        let mut runtime = fresh_match(1);
        runtime
            .meta
            .war_mut()
            .unwrap()
            .wins
            .insert("u2".to_string(), 2);
        // Final trick ties, so counts stay 0 and 2.
        rig_hands(
            &mut runtime,
            french(FrenchRank::Seven, FrenchSuit::Clubs),
            french(FrenchRank::Seven, FrenchSuit::Spades),
        );
        WarRules
            .handle_action(&mut runtime, 0, &Action::PlayTop)
            .unwrap();
        let applied = WarRules
            .handle_action(&mut runtime, 1, &Action::PlayTop)
            .unwrap();
        assert_eq!(applied.outcome, Some(MatchOutcome::Winner { seat: 1 }));
    }

    #[test]
    fn test_foreign_actions_are_unsupported() {
        let mut runtime = fresh_match(1);
        for action in [
            Action::DrawCard,
            Action::Pass,
            Action::PlayCard { index: 0 },
        ] {
            let err = WarRules.handle_action(&mut runtime, 0, &action).unwrap_err();
            assert_eq!(err, RulesError::UnsupportedAction);
        }
    }

    #[test]
    fn test_census_constant_over_whole_match() {
        let mut runtime = fresh_match(7);
        while !runtime.is_finished() {
            let actor = runtime.turn_index;
            WarRules
                .handle_action(&mut runtime, actor, &Action::PlayTop)
                .unwrap();
            assert_eq!(runtime.card_census(), 52);
        }
        assert!(runtime.outcome.is_some());
    }

    #[test]
    fn test_bot_always_flips_on_its_turn() {
        let runtime = fresh_match(1);
        assert_eq!(WarRules.bot_decision(&runtime, 0), Some(Action::PlayTop));
        assert_eq!(WarRules.bot_decision(&runtime, 1), None);
    }

    #[test]
    fn test_public_state_shows_trick_in_progress() {
        let mut runtime = fresh_match(1);
        WarRules
            .handle_action(&mut runtime, 0, &Action::PlayTop)
            .unwrap();
        let view = WarRules.public_state(&runtime);
        assert_eq!(view.table.len(), 1);
        assert_eq!(view.turn.as_deref(), Some("Bob"));
        assert!(view.headline.contains("Bob"));
    }
}

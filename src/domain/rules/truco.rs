//! Truco - Argentine trick game, head to head, stripped Spanish deck
//!
//! Three-card hands, the classic power order (espadas ace on top), best
//! of three tricks per hand with parda fallbacks, one match point per
//! hand, first to twelve.

use rand::seq::SliceRandom;
use serde_json::json;

use crate::domain::actions::Action;
use crate::domain::cards::{Card, SpanishCard, SpanishRank, SpanishSuit};
use crate::domain::deck::DeckKind;
use crate::domain::match_runtime::{MatchOutcome, MatchPhase, MatchRuntime};
use crate::domain::rules::{Applied, GameKind, GameRules, RulesError, SeatLimits};
use crate::domain::view::{Choice, Scoreboard, TableView};

/// Match points that end it.
pub const TARGET_POINTS: u8 = 12;
/// Cards per hand.
pub const HAND_SIZE: usize = 3;

/// Ranks the truco deck never carries.
pub fn excluded_ranks() -> Vec<SpanishRank> {
    vec![
        SpanishRank::Numeral(8),
        SpanishRank::Numeral(9),
        SpanishRank::Joker,
    ]
}

/// Truco power of a card, 14 down to 1. The two real aces and the two
/// real sevens outrank their look-alikes; jokers and the stripped ranks
/// have no power at all.
pub fn card_power(card: SpanishCard) -> Option<u8> {
    let n = match card.rank {
        SpanishRank::Numeral(n) => n,
        SpanishRank::Joker => return None,
    };
    let power = match (n, card.suit) {
        (1, SpanishSuit::Espadas) => 14,
        (1, SpanishSuit::Bastos) => 13,
        (7, SpanishSuit::Espadas) => 12,
        (7, SpanishSuit::Oros) => 11,
        (3, _) => 10,
        (2, _) => 9,
        (1, _) => 8,
        (12, _) => 7,
        (11, _) => 6,
        (10, _) => 5,
        (7, _) => 4,
        (6, _) => 3,
        (5, _) => 2,
        (4, _) => 1,
        _ => return None,
    };
    Some(power)
}

/// Who takes the hand given the tricks so far, or None while it is
/// still open. Two trick wins settle it outright; pardas fall back to
/// the earliest decided trick, and a hand that ties out entirely goes
/// to whoever led it.
fn hand_winner(results: &[Option<usize>], hand_starter: usize) -> Option<usize> {
    for seat in 0..2 {
        if results.iter().filter(|r| **r == Some(seat)).count() >= 2 {
            return Some(seat);
        }
    }
    if results.iter().any(|r| r.is_none()) {
        match results.len() {
            2 => results.iter().filter_map(|r| *r).next(),
            3 => Some(
                results
                    .iter()
                    .filter_map(|r| *r)
                    .next()
                    .unwrap_or(hand_starter),
            ),
            _ => None,
        }
    } else {
        None
    }
}

pub struct TrucoRules;

impl TrucoRules {
    fn deal(&self, runtime: &mut MatchRuntime) -> Result<(), RulesError> {
        for _ in 0..HAND_SIZE {
            for seat in 0..runtime.seat_count() {
                let card = runtime
                    .deck
                    .pop()
                    .ok_or(RulesError::CorruptState("truco deck too short to deal"))?;
                runtime.seats[seat].hand.push(card);
            }
        }
        Ok(())
    }

    /// Collect every card back into the deck, reshuffle and deal the
    /// next hand with `starter` leading.
    fn redeal(&self, runtime: &mut MatchRuntime, starter: usize) -> Result<(), RulesError> {
        let mut cards: Vec<Card> = runtime.table.drain(..).collect();
        for seat in runtime.seats.iter_mut() {
            cards.extend(seat.hand.drain(..));
        }
        cards.append(&mut runtime.deck);
        let mut rng = rand::thread_rng();
        cards.shuffle(&mut rng);
        runtime.deck = cards;
        self.deal(runtime)?;

        let meta = runtime.meta.truco_mut()?;
        meta.hand_starter = starter;
        meta.trick_leader = starter;
        meta.trick_plays.clear();
        meta.trick_results.clear();
        runtime.turn_index = starter;
        Ok(())
    }

    fn play_card(
        &self,
        runtime: &mut MatchRuntime,
        actor: usize,
        index: usize,
    ) -> Result<Applied, RulesError> {
        if index >= runtime.seats[actor].hand.len() {
            return Err(RulesError::IllegalMove("no such card in hand"));
        }
        let card = runtime.seats[actor].hand[index]
            .spanish()
            .ok_or(RulesError::CorruptState("non-spanish card in truco match"))?;
        if card_power(card).is_none() {
            return Err(RulesError::CorruptState("powerless card in truco hand"));
        }

        let actor_name = runtime.seats[actor].display_name.clone();
        let played = runtime.seats[actor].hand.remove(index);
        runtime.table.push(played);
        let plays_so_far = {
            let meta = runtime.meta.truco_mut()?;
            meta.trick_plays.push((actor, card));
            meta.trick_plays.len()
        };

        if plays_so_far < 2 {
            runtime.next_turn();
            return Ok(Applied::note(format!(
                "{} plays {}",
                actor_name,
                card.label()
            )));
        }

        self.resolve_trick(runtime, actor_name, card)
    }

    fn resolve_trick(
        &self,
        runtime: &mut MatchRuntime,
        actor_name: String,
        card: SpanishCard,
    ) -> Result<Applied, RulesError> {
        let (first_seat, first_card, second_seat, second_card) = {
            let meta = runtime.meta.truco()?;
            let (fs, fc) = meta.trick_plays[0];
            let (ss, sc) = meta.trick_plays[1];
            (fs, fc, ss, sc)
        };
        let first_power =
            card_power(first_card).ok_or(RulesError::CorruptState("powerless trick card"))?;
        let second_power =
            card_power(second_card).ok_or(RulesError::CorruptState("powerless trick card"))?;

        let trick_winner = if first_power > second_power {
            Some(first_seat)
        } else if second_power > first_power {
            Some(second_seat)
        } else {
            None
        };

        let (results, hand_starter) = {
            let meta = runtime.meta.truco_mut()?;
            meta.trick_plays.clear();
            meta.trick_results.push(trick_winner);
            (meta.trick_results.clone(), meta.hand_starter)
        };

        let mut note = format!("{} plays {}", actor_name, card.label());
        match trick_winner {
            Some(w) => note.push_str(&format!(
                " - {} takes the trick",
                runtime.seats[w].display_name
            )),
            None => note.push_str(" - parda, nobody takes it"),
        }

        match hand_winner(&results, hand_starter) {
            Some(hw) => self.score_hand(runtime, hw, note),
            None => {
                // Winner leads the next trick; a parda keeps the same
                // leader.
                let leader = {
                    let meta = runtime.meta.truco_mut()?;
                    if let Some(w) = trick_winner {
                        meta.trick_leader = w;
                    }
                    meta.trick_leader
                };
                runtime.turn_index = leader;
                Ok(Applied::note(note))
            }
        }
    }

    fn score_hand(
        &self,
        runtime: &mut MatchRuntime,
        winner: usize,
        mut note: String,
    ) -> Result<Applied, RulesError> {
        let winner_id = runtime.seats[winner].user_id.clone();
        let winner_name = runtime.seats[winner].display_name.clone();
        let points = {
            let meta = runtime.meta.truco_mut()?;
            let entry = meta.match_points.entry(winner_id).or_insert(0);
            *entry += 1;
            *entry
        };
        note.push_str(&format!(
            ". {} takes the hand ({} of {})",
            winner_name, points, TARGET_POINTS
        ));

        if points >= TARGET_POINTS {
            runtime.finish(MatchOutcome::Winner { seat: winner })?;
            return Ok(Applied::finished(
                MatchOutcome::Winner { seat: winner },
                format!("{} reaches {} and wins the match", winner_name, TARGET_POINTS),
            ));
        }

        self.redeal(runtime, winner)?;
        Ok(Applied::note(note))
    }
}

impl GameRules for TrucoRules {
    fn kind(&self) -> GameKind {
        GameKind::Truco
    }

    fn seat_limits(&self) -> SeatLimits {
        SeatLimits::exactly(2)
    }

    fn deck_kind(&self) -> DeckKind {
        DeckKind::Spanish {
            excluded: excluded_ranks(),
        }
    }

    fn init(&self, runtime: &mut MatchRuntime) -> Result<(), RulesError> {
        self.deal(runtime)
    }

    fn handle_action(
        &self,
        runtime: &mut MatchRuntime,
        actor: usize,
        action: &Action,
    ) -> Result<Applied, RulesError> {
        match action {
            Action::PlayCard { index } => self.play_card(runtime, actor, *index),
            _ => Err(RulesError::UnsupportedAction),
        }
    }

    fn public_state(&self, runtime: &MatchRuntime) -> TableView {
        let meta = runtime.meta.truco().ok();
        let trick: Vec<String> = meta
            .map(|m| {
                m.trick_plays
                    .iter()
                    .map(|(seat, card)| {
                        format!("{}: {}", runtime.seats[*seat].display_name, card.label())
                    })
                    .collect()
            })
            .unwrap_or_default();
        let tricks_so_far: Vec<serde_json::Value> = meta
            .map(|m| {
                m.trick_results
                    .iter()
                    .map(|r| match r {
                        Some(seat) => json!(runtime.seats[*seat].display_name),
                        None => json!("parda"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let points: Vec<serde_json::Value> = runtime
            .seats
            .iter()
            .map(|s| {
                let p = meta
                    .and_then(|m| m.match_points.get(&s.user_id).copied())
                    .unwrap_or(0);
                json!({ "name": s.display_name, "points": p })
            })
            .collect();
        let headline = if runtime.phase == MatchPhase::Finished {
            "Truco - match over".to_string()
        } else {
            format!("Truco - {} to play", runtime.current_seat().display_name)
        };
        TableView {
            game: GameKind::Truco,
            headline,
            table: trick,
            turn: (runtime.phase != MatchPhase::Finished)
                .then(|| runtime.current_seat().display_name.clone()),
            detail: json!({
                "points": points,
                "tricks": tricks_so_far,
                "target": TARGET_POINTS,
            }),
        }
    }

    fn player_choices(&self, runtime: &MatchRuntime, actor: usize) -> Vec<Choice> {
        if runtime.phase != MatchPhase::Playing || actor != runtime.turn_index {
            return Vec::new();
        }
        runtime.seats[actor]
            .hand
            .iter()
            .enumerate()
            .map(|(i, card)| {
                Choice::new(Action::PlayCard { index: i }, format!("Play {}", card.label()))
            })
            .collect()
    }

    fn scoreboard(&self, runtime: &MatchRuntime) -> Option<Scoreboard> {
        let meta = runtime.meta.truco().ok()?;
        let mut board = Scoreboard::new(format!("Truco - first to {}", TARGET_POINTS));
        for seat in &runtime.seats {
            let points = meta.match_points.get(&seat.user_id).copied().unwrap_or(0);
            board = board.line(seat.display_name.clone(), points as i32);
        }
        Some(board)
    }

    fn bot_decision(&self, runtime: &MatchRuntime, actor: usize) -> Option<Action> {
        if runtime.phase != MatchPhase::Playing || actor != runtime.turn_index {
            return None;
        }
        let meta = runtime.meta.truco().ok()?;
        let hand = &runtime.seats[actor].hand;
        if hand.is_empty() {
            return None;
        }
        let power_at = |i: usize| {
            hand[i]
                .spanish()
                .and_then(card_power)
                .unwrap_or(0)
        };

        if let Some((_, lead_card)) = meta.trick_plays.first() {
            // Following: cheapest card that still wins, else dump the
            // cheapest.
            let to_beat = card_power(*lead_card).unwrap_or(0);
            let mut cheapest_winner: Option<usize> = None;
            let mut cheapest: usize = 0;
            for i in 0..hand.len() {
                if power_at(i) < power_at(cheapest) {
                    cheapest = i;
                }
                if power_at(i) > to_beat {
                    match cheapest_winner {
                        Some(cw) if power_at(i) >= power_at(cw) => {}
                        _ => cheapest_winner = Some(i),
                    }
                }
            }
            Some(Action::PlayCard {
                index: cheapest_winner.unwrap_or(cheapest),
            })
        } else {
            // Leading: come out strongest.
            let mut strongest = 0;
            for i in 1..hand.len() {
                if power_at(i) > power_at(strongest) {
                    strongest = i;
                }
            }
            Some(Action::PlayCard { index: strongest })
        }
    }
}

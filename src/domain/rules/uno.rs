//! Uno - shedding game for two to ten seats
//!
//! Matching by color or face, action cards that skip, reverse and stack
//! draw penalties, wilds that force a color. First empty hand wins the
//! match on the spot.

use rand::seq::SliceRandom;
use serde_json::json;

use crate::domain::actions::Action;
use crate::domain::cards::{Card, UnoCard, UnoColor, UnoFace};
use crate::domain::deck::DeckKind;
use crate::domain::match_runtime::{MatchOutcome, MatchPhase, MatchRuntime};
use crate::domain::rules::{Applied, GameKind, GameRules, RulesError, SeatLimits};
use crate::domain::view::{Choice, TableView};

/// Opening hand size.
pub const HAND_SIZE: usize = 7;

/// Whether `card` may go on `top` right now. A forced color (set by a
/// wild) replaces the top card's own color; wilds always match.
pub fn is_playable(card: UnoCard, top: UnoCard, forced: Option<UnoColor>) -> bool {
    if card.is_wild() {
        return true;
    }
    match forced {
        Some(color) => card.color() == Some(color),
        None => {
            card.color() == top.color() || (card.face().is_some() && card.face() == top.face())
        }
    }
}

pub struct UnoRules;

impl UnoRules {
    fn top_card(&self, runtime: &MatchRuntime) -> Result<UnoCard, RulesError> {
        runtime
            .table
            .last()
            .and_then(|c| c.uno())
            .ok_or(RulesError::CorruptState("uno table has no top card"))
    }

    /// Move the turn `steps` seats along the current direction and open
    /// the next player's draw allowance.
    fn pass_turn(&self, runtime: &mut MatchRuntime, steps: i64) -> Result<(), RulesError> {
        let direction = runtime.meta.uno()?.direction as i64;
        runtime.advance(direction * steps);
        runtime.meta.uno_mut()?.drawn_this_turn = false;
        Ok(())
    }

    /// Pop one card to hand out, recycling the table under its top card
    /// when the deck runs dry. None means there is nothing left anywhere.
    fn draw_one(&self, runtime: &mut MatchRuntime) -> Option<Card> {
        if runtime.deck.is_empty() && runtime.table.len() > 1 {
            let top = runtime.table.pop()?;
            let mut recycled: Vec<Card> = runtime.table.drain(..).collect();
            runtime.table.push(top);
            let mut rng = rand::thread_rng();
            recycled.shuffle(&mut rng);
            runtime.deck = recycled;
        }
        runtime.deck.pop()
    }

    fn play_card(
        &self,
        runtime: &mut MatchRuntime,
        actor: usize,
        index: usize,
    ) -> Result<Applied, RulesError> {
        if runtime.meta.uno()?.awaiting_color.is_some() {
            return Err(RulesError::IllegalMove("choose a color first"));
        }
        if index >= runtime.seats[actor].hand.len() {
            return Err(RulesError::IllegalMove("no such card in hand"));
        }
        let card = runtime.seats[actor].hand[index]
            .uno()
            .ok_or(RulesError::CorruptState("non-uno card in uno match"))?;
        let top = self.top_card(runtime)?;
        let meta = runtime.meta.uno()?;
        if meta.pending_draw > 0 && card != UnoCard::WildDrawFour {
            return Err(RulesError::IllegalMove(
                "stack a wild draw four or draw the penalty",
            ));
        }
        if !is_playable(card, top, meta.forced_color) {
            return Err(RulesError::IllegalMove("that card does not match the top"));
        }

        let actor_name = runtime.seats[actor].display_name.clone();
        let played = runtime.seats[actor].hand.remove(index);
        runtime.table.push(played);

        // An emptied hand wins immediately, before any effect or color
        // choice the card would otherwise demand.
        if runtime.seats[actor].hand.is_empty() {
            runtime.finish(MatchOutcome::Winner { seat: actor })?;
            return Ok(Applied::finished(
                MatchOutcome::Winner { seat: actor },
                format!("{} plays {} and goes out", actor_name, card.label()),
            ));
        }

        let mut note = format!("{} plays {}", actor_name, card.label());
        if runtime.seats[actor].hand.len() == 1 {
            note.push_str(" - UNO!");
        }

        match card {
            UnoCard::Colored { face, .. } => {
                runtime.meta.uno_mut()?.forced_color = None;
                match face {
                    UnoFace::Number(_) => self.pass_turn(runtime, 1)?,
                    UnoFace::Skip => {
                        let skipped = self.peek_seat(runtime, 1)?;
                        note.push_str(&format!(
                            ", skipping {}",
                            runtime.seats[skipped].display_name
                        ));
                        self.pass_turn(runtime, 2)?;
                    }
                    UnoFace::Reverse => {
                        if runtime.seat_count() == 2 {
                            // Reverse acts as a skip head to head.
                            note.push_str(" - play comes straight back");
                            self.pass_turn(runtime, 2)?;
                        } else {
                            let meta = runtime.meta.uno_mut()?;
                            meta.direction = -meta.direction;
                            note.push_str(" - direction reverses");
                            self.pass_turn(runtime, 1)?;
                        }
                    }
                    UnoFace::DrawTwo => {
                        let total = {
                            let meta = runtime.meta.uno_mut()?;
                            meta.pending_draw += 2;
                            meta.pending_draw
                        };
                        note.push_str(&format!(" - next player owes {}", total));
                        self.pass_turn(runtime, 1)?;
                    }
                }
            }
            UnoCard::Wild => {
                let meta = runtime.meta.uno_mut()?;
                meta.awaiting_color = Some(actor);
                note.push_str(" and is choosing a color");
            }
            UnoCard::WildDrawFour => {
                let meta = runtime.meta.uno_mut()?;
                meta.pending_draw += 4;
                meta.awaiting_color = Some(actor);
                note.push_str(&format!(
                    " - penalty rises to {}, color coming",
                    meta.pending_draw
                ));
            }
        }
        runtime.meta.uno_mut()?.dry_passes = 0;

        Ok(Applied::note(note))
    }

    fn choose_color(
        &self,
        runtime: &mut MatchRuntime,
        actor: usize,
        color: UnoColor,
    ) -> Result<Applied, RulesError> {
        if runtime.meta.uno()?.awaiting_color != Some(actor) {
            return Err(RulesError::IllegalMove("no color choice is open"));
        }
        {
            let meta = runtime.meta.uno_mut()?;
            meta.awaiting_color = None;
            meta.forced_color = Some(color);
        }
        let actor_name = runtime.seats[actor].display_name.clone();
        self.pass_turn(runtime, 1)?;
        Ok(Applied::note(format!(
            "{} calls {}",
            actor_name,
            color.as_str()
        )))
    }

    fn draw_card(&self, runtime: &mut MatchRuntime, actor: usize) -> Result<Applied, RulesError> {
        if runtime.meta.uno()?.awaiting_color.is_some() {
            return Err(RulesError::IllegalMove("choose a color first"));
        }
        let actor_name = runtime.seats[actor].display_name.clone();
        let pending = runtime.meta.uno()?.pending_draw;

        if pending > 0 {
            // Swallow the whole accumulated stack and lose the turn.
            let mut drawn = 0u8;
            for _ in 0..pending {
                match self.draw_one(runtime) {
                    Some(card) => {
                        runtime.seats[actor].hand.push(card);
                        drawn += 1;
                    }
                    None => break,
                }
            }
            {
                let meta = runtime.meta.uno_mut()?;
                meta.pending_draw = 0;
                if drawn > 0 {
                    meta.dry_passes = 0;
                }
            }
            self.pass_turn(runtime, 1)?;
            return Ok(Applied::note(format!(
                "{} draws {} and loses the turn",
                actor_name, drawn
            )));
        }

        if runtime.meta.uno()?.drawn_this_turn {
            return Err(RulesError::IllegalMove("only one draw per turn"));
        }

        match self.draw_one(runtime) {
            Some(card) => {
                runtime.seats[actor].hand.push(card);
                {
                    let meta = runtime.meta.uno_mut()?;
                    meta.drawn_this_turn = true;
                    meta.dry_passes = 0;
                }
                let drawn = card
                    .uno()
                    .ok_or(RulesError::CorruptState("non-uno card drawn"))?;
                let top = self.top_card(runtime)?;
                let forced = runtime.meta.uno()?.forced_color;
                if is_playable(drawn, top, forced) {
                    // Playable: the turn stays so they can play it or pass.
                    Ok(Applied::note(format!("{} draws a card", actor_name)))
                } else {
                    self.pass_turn(runtime, 1)?;
                    Ok(Applied::note(format!(
                        "{} draws and passes",
                        actor_name
                    )))
                }
            }
            None => {
                // Nothing left to hand out anywhere; the draw is a pass.
                // A full lap of dry passes means nobody can move at all.
                let seats = runtime.seat_count();
                let stuck = {
                    let meta = runtime.meta.uno_mut()?;
                    meta.dry_passes = meta.dry_passes.saturating_add(1);
                    meta.dry_passes as usize >= seats
                };
                if stuck {
                    runtime.finish(MatchOutcome::Draw)?;
                    return Ok(Applied::finished(
                        MatchOutcome::Draw,
                        "Deck is out and nobody can move - the match is drawn",
                    ));
                }
                self.pass_turn(runtime, 1)?;
                Ok(Applied::note(format!(
                    "Deck is dry - {} passes",
                    actor_name
                )))
            }
        }
    }

    fn pass(&self, runtime: &mut MatchRuntime, actor: usize) -> Result<Applied, RulesError> {
        if runtime.meta.uno()?.awaiting_color.is_some() {
            return Err(RulesError::IllegalMove("choose a color first"));
        }
        if !runtime.meta.uno()?.drawn_this_turn {
            return Err(RulesError::IllegalMove("draw before passing"));
        }
        let actor_name = runtime.seats[actor].display_name.clone();
        self.pass_turn(runtime, 1)?;
        Ok(Applied::note(format!("{} passes", actor_name)))
    }

    /// Seat the turn would land on `steps` ahead, without moving it.
    fn peek_seat(&self, runtime: &MatchRuntime, steps: i64) -> Result<usize, RulesError> {
        let direction = runtime.meta.uno()?.direction as i64;
        let seats = runtime.seat_count() as i64;
        Ok((runtime.turn_index as i64 + direction * steps).rem_euclid(seats) as usize)
    }

    fn active_color(&self, runtime: &MatchRuntime) -> Option<UnoColor> {
        let meta = runtime.meta.uno().ok()?;
        if let Some(color) = meta.forced_color {
            return Some(color);
        }
        self.top_card(runtime).ok()?.color()
    }
}

impl GameRules for UnoRules {
    fn kind(&self) -> GameKind {
        GameKind::Uno
    }

    fn seat_limits(&self) -> SeatLimits {
        SeatLimits::between(2, 10)
    }

    fn deck_kind(&self) -> DeckKind {
        DeckKind::Uno
    }

    fn init(&self, runtime: &mut MatchRuntime) -> Result<(), RulesError> {
        for _ in 0..HAND_SIZE {
            for seat in 0..runtime.seat_count() {
                let card = self
                    .draw_one(runtime)
                    .ok_or(RulesError::CorruptState("uno deck too short to deal"))?;
                runtime.seats[seat].hand.push(card);
            }
        }
        // Flip the start card, sliding wilds under the deck until a
        // colored one shows. Its action face carries no effect.
        loop {
            let card = runtime
                .deck
                .pop()
                .ok_or(RulesError::CorruptState("uno deck exhausted before start"))?;
            let uno = card
                .uno()
                .ok_or(RulesError::CorruptState("non-uno card in uno deck"))?;
            if uno.is_wild() {
                runtime.deck.insert(0, card);
            } else {
                runtime.table.push(card);
                break;
            }
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
            Action::PlayCard { index } => self.play_card(runtime, actor, *index),
            Action::ChooseColor { color } => self.choose_color(runtime, actor, *color),
            Action::DrawCard => self.draw_card(runtime, actor),
            Action::Pass => self.pass(runtime, actor),
            _ => Err(RulesError::UnsupportedAction),
        }
    }

    fn public_state(&self, runtime: &MatchRuntime) -> TableView {
        let meta = runtime.meta.uno().ok();
        let top_label = runtime
            .table
            .last()
            .map(|c| c.label())
            .unwrap_or_else(|| "-".to_string());
        let hands: Vec<serde_json::Value> = runtime
            .seats
            .iter()
            .map(|s| json!({ "name": s.display_name, "cards": s.hand.len() }))
            .collect();
        let headline = if runtime.phase == MatchPhase::Finished {
            "Uno - match over".to_string()
        } else {
            format!("Uno - {} to play on {}", runtime.current_seat().display_name, top_label)
        };
        TableView {
            game: GameKind::Uno,
            headline,
            table: vec![top_label],
            turn: (runtime.phase != MatchPhase::Finished)
                .then(|| runtime.current_seat().display_name.clone()),
            detail: json!({
                "activeColor": self.active_color(runtime).map(|c| c.as_str()),
                "direction": meta.map(|m| if m.direction >= 0 { "clockwise" } else { "counterclockwise" }),
                "pendingDraw": meta.map(|m| m.pending_draw).unwrap_or(0),
                "deckSize": runtime.deck.len(),
                "hands": hands,
            }),
        }
    }

    fn player_choices(&self, runtime: &MatchRuntime, actor: usize) -> Vec<Choice> {
        if runtime.phase != MatchPhase::Playing {
            return Vec::new();
        }
        let Ok(meta) = runtime.meta.uno() else {
            return Vec::new();
        };

        if meta.awaiting_color == Some(actor) {
            return UnoColor::ALL
                .iter()
                .map(|c| {
                    Choice::new(
                        Action::ChooseColor { color: *c },
                        format!("Call {}", c.as_str()),
                    )
                })
                .collect();
        }
        if actor != runtime.turn_index || meta.awaiting_color.is_some() {
            return Vec::new();
        }

        let Ok(top) = self.top_card(runtime) else {
            return Vec::new();
        };
        let mut choices = Vec::new();
        for (i, card) in runtime.seats[actor].hand.iter().enumerate() {
            let Some(uno) = card.uno() else { continue };
            if meta.pending_draw > 0 {
                if uno == UnoCard::WildDrawFour {
                    choices.push(Choice::new(
                        Action::PlayCard { index: i },
                        format!("Stack {}", uno.label()),
                    ));
                }
            } else if is_playable(uno, top, meta.forced_color) {
                choices.push(Choice::new(
                    Action::PlayCard { index: i },
                    format!("Play {}", uno.label()),
                ));
            }
        }
        if meta.pending_draw > 0 {
            choices.push(Choice::new(
                Action::DrawCard,
                format!("Draw {}", meta.pending_draw),
            ));
        } else if meta.drawn_this_turn {
            choices.push(Choice::new(Action::Pass, "Pass"));
        } else {
            choices.push(Choice::new(Action::DrawCard, "Draw a card"));
        }
        choices
    }

    fn bot_decision(&self, runtime: &MatchRuntime, actor: usize) -> Option<Action> {
        if runtime.phase != MatchPhase::Playing {
            return None;
        }
        let meta = runtime.meta.uno().ok()?;

        if meta.awaiting_color == Some(actor) {
            // Call the color we hold the most of.
            let mut counts = [0usize; 4];
            for card in &runtime.seats[actor].hand {
                if let Some(color) = card.uno().and_then(|c| c.color()) {
                    counts[color as usize] += 1;
                }
            }
            let best = UnoColor::ALL
                .iter()
                .copied()
                .max_by_key(|c| counts[*c as usize])
                .unwrap_or(UnoColor::Red);
            return Some(Action::ChooseColor { color: best });
        }
        if actor != runtime.turn_index || meta.awaiting_color.is_some() {
            return None;
        }

        let top = self.top_card(runtime).ok()?;
        let hand = &runtime.seats[actor].hand;

        if meta.pending_draw > 0 {
            if let Some(i) = hand
                .iter()
                .position(|c| c.uno() == Some(UnoCard::WildDrawFour))
            {
                return Some(Action::PlayCard { index: i });
            }
            return Some(Action::DrawCard);
        }

        // Spend matching colored cards before burning wilds.
        if let Some(i) = hand.iter().position(|c| {
            c.uno()
                .map(|u| !u.is_wild() && is_playable(u, top, meta.forced_color))
                .unwrap_or(false)
        }) {
            return Some(Action::PlayCard { index: i });
        }
        if let Some(i) = hand.iter().position(|c| {
            c.uno().map(|u| u.is_wild()).unwrap_or(false)
        }) {
            return Some(Action::PlayCard { index: i });
        }
        if meta.drawn_this_turn {
            Some(Action::Pass)
        } else {
            Some(Action::DrawCard)
        }
    }
}

//! Action - the platform-facing action tokens a player can submit
//!
//! Tokens are minted as buttons by the presenter and replayed verbatim
//! when pressed, so they serialize as tagged JSON.

use serde::{Deserialize, Serialize};

use crate::domain::cards::UnoColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Play the top card of the actor's hand.
    PlayTop,
    /// Play the hand card at `index`.
    PlayCard { index: usize },
    /// Draw from the deck.
    DrawCard,
    /// Keep a drawn card and end the turn.
    Pass,
    /// Settle the color of a wild just played.
    ChooseColor { color: UnoColor },
    /// Answer an open escalation. The one action class a non-current
    /// player may submit; eligibility is the rules engine's call.
    Respond { accept: bool },
}

impl Action {
    /// Response-class actions bypass the turn gate.
    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self, Action::Respond { .. })
    }

    /// The token's tag, as it appears on the wire.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Action::PlayTop => "playTop",
            Action::PlayCard { .. } => "playCard",
            Action::DrawCard => "drawCard",
            Action::Pass => "pass",
            Action::ChooseColor { .. } => "chooseColor",
            Action::Respond { .. } => "respond",
        }
    }
}

//! Seat - one participant slot inside a match

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::domain::cards::Card;

/// Hand storage; the inline capacity covers every opening deal except War's.
pub type Hand = SmallVec<[Card; 8]>;

/// Who occupies a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeatKind {
    Human,
    Bot,
}

impl SeatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatKind::Human => "human",
            SeatKind::Bot => "bot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "human" => Some(SeatKind::Human),
            "bot" => Some(SeatKind::Bot),
            _ => None,
        }
    }
}

/// A participant slot: identity, current hand, optional team tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub user_id: String,
    pub display_name: String,
    pub kind: SeatKind,
    pub hand: Hand,
    pub team: Option<u8>,
}

impl Seat {
    pub fn human(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Seat {
            user_id: user_id.into(),
            display_name: display_name.into(),
            kind: SeatKind::Human,
            hand: SmallVec::new(),
            team: None,
        }
    }

    pub fn bot(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Seat {
            user_id: user_id.into(),
            display_name: display_name.into(),
            kind: SeatKind::Bot,
            hand: SmallVec::new(),
            team: None,
        }
    }

    pub fn with_team(mut self, team: u8) -> Self {
        self.team = Some(team);
        self
    }

    #[inline]
    pub fn is_bot(&self) -> bool {
        self.kind == SeatKind::Bot
    }
}

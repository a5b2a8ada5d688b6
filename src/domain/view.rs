//! View - the textual projections the presenter renders into the room
//!
//! Typed core plus a loose JSON `detail` blob for whatever a game wants
//! to show beyond it.

use serde::{Deserialize, Serialize};

use crate::domain::actions::Action;
use crate::domain::rules::GameKind;

/// The public table: what every spectator in the room sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub game: GameKind,
    /// One-line summary, e.g. "Round 3 - Alice to play".
    pub headline: String,
    /// Rendered cards face up on the table, play order.
    pub table: Vec<String>,
    /// Display name of the seat holding the turn; None once finished.
    pub turn: Option<String>,
    /// Game-specific extras (direction, forced color, trick tallies, ...).
    pub detail: serde_json::Value,
}

/// A button offered privately to one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub action: Action,
    pub label: String,
}

impl Choice {
    pub fn new(action: Action, label: impl Into<String>) -> Self {
        Choice {
            action,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLine {
    pub name: String,
    pub points: i32,
}

/// Standings snapshot for games that keep a running score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    pub title: String,
    pub lines: Vec<ScoreLine>,
}

impl Scoreboard {
    pub fn new(title: impl Into<String>) -> Self {
        Scoreboard {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, name: impl Into<String>, points: i32) -> Self {
        self.lines.push(ScoreLine {
            name: name.into(),
            points,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_builder() {
        let board = Scoreboard::new("first to 5").line("Alice", 3).line("Bob", 1);
        assert_eq!(board.lines.len(), 2);
        assert_eq!(board.lines[0].name, "Alice");
        assert_eq!(board.lines[1].points, 1);
    }

    #[test]
    fn test_choice_label() {
        let choice = Choice::new(Action::DrawCard, "Draw a card");
        assert_eq!(choice.label, "Draw a card");
        assert_eq!(choice.action, Action::DrawCard);
    }
}

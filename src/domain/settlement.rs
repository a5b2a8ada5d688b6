//! Settlement - wager transfers derived from a finished match
//!
//! Pure computation; applying the transfers to the ledger is the
//! application layer's job and happens at most once per match.

use serde::{Deserialize, Serialize};

use crate::domain::match_runtime::MatchOutcome;
use crate::domain::seat::{Seat, SeatKind};

/// One balance adjustment produced by settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub user_id: String,
    pub delta: i64,
}

/// Work out who pays whom once the outcome is known. Bots hold no
/// balance: a bot loser owes nothing and a bot winner destroys the
/// stakes instead of collecting them. Draws and timeouts move nothing.
pub fn wager_transfers(seats: &[Seat], bet: u64, outcome: MatchOutcome) -> Vec<Transfer> {
    if bet == 0 {
        return Vec::new();
    }
    let stake = bet as i64;

    match outcome {
        MatchOutcome::Draw => Vec::new(),
        MatchOutcome::Winner { seat } => {
            let mut transfers = Vec::new();
            let mut pot: i64 = 0;
            for (i, s) in seats.iter().enumerate() {
                if i != seat && s.kind == SeatKind::Human {
                    transfers.push(Transfer {
                        user_id: s.user_id.clone(),
                        delta: -stake,
                    });
                    pot += stake;
                }
            }
            let winner = &seats[seat];
            if winner.kind == SeatKind::Human && pot > 0 {
                transfers.push(Transfer {
                    user_id: winner.user_id.clone(),
                    delta: pot,
                });
            }
            transfers
        }
        MatchOutcome::TeamWin { team } => {
            let mut transfers = Vec::new();
            let mut pot: i64 = 0;
            for s in seats {
                if s.team != Some(team) && s.kind == SeatKind::Human {
                    transfers.push(Transfer {
                        user_id: s.user_id.clone(),
                        delta: -stake,
                    });
                    pot += stake;
                }
            }
            let winners: Vec<&Seat> = seats
                .iter()
                .filter(|s| s.team == Some(team) && s.kind == SeatKind::Human)
                .collect();
            if !winners.is_empty() && pot > 0 {
                let share = pot / winners.len() as i64;
                let remainder = pot % winners.len() as i64;
                for (i, w) in winners.iter().enumerate() {
                    // The first winner takes the whole integer remainder.
                    let delta = if i == 0 { share + remainder } else { share };
                    if delta > 0 {
                        transfers.push(Transfer {
                            user_id: w.user_id.clone(),
                            delta,
                        });
                    }
                }
            }
            transfers
        }
    }
}

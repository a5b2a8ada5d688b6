//! Ports - the capabilities the host platform provides to the runtime
//!
//! The chat platform fronts every match; it appears here as two traits,
//! one for balances and one for rendering. Adapters live in
//! infrastructure.

use async_trait::async_trait;

use crate::domain::view::{Choice, Scoreboard, TableView};

/// Error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Unknown account: {0}")]
    UnknownAccount(String),
    #[error("Ledger backend error: {0}")]
    Backend(String),
}

/// The balance ledger the platform keeps for human players.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Atomically adjust a balance by a signed delta; returns the new
    /// balance.
    async fn adjust(&self, user_id: &str, delta: i64) -> Result<i64, LedgerError>;

    /// Current balance; accounts spring into existence at zero.
    async fn balance(&self, user_id: &str) -> Result<i64, LedgerError>;
}

/// Error type for presenter deliveries
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Channel closed")]
    Closed,
}

/// The rendering surface for a match: public table, private choice
/// menus, private notices, room-wide announcements.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Replace the public table view; `note` is a one-line commentary on
    /// what just happened.
    async fn publish_table(
        &self,
        match_id: &str,
        view: &TableView,
        note: Option<&str>,
    ) -> Result<(), PresentError>;

    /// Offer one player their current buttons.
    async fn present_choices(
        &self,
        match_id: &str,
        user_id: &str,
        choices: &[Choice],
    ) -> Result<(), PresentError>;

    /// Publish the running standings.
    async fn publish_scoreboard(
        &self,
        match_id: &str,
        board: &Scoreboard,
    ) -> Result<(), PresentError>;

    /// Short-lived private notice (rejections, hints).
    async fn notify(&self, match_id: &str, user_id: &str, text: &str)
        -> Result<(), PresentError>;

    /// Room-wide announcement (results, timeouts).
    async fn announce(&self, match_id: &str, text: &str) -> Result<(), PresentError>;
}

//! In-memory ledger adapter
//!
//! Stands in for the platform's balance store during demos and tests.
//! Accounts spring into existence at zero; the room never blocks a
//! debit, so balances can go negative.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{Ledger, LedgerError};

pub struct InMemoryLedger {
    accounts: RwLock<HashMap<String, i64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Seed an account, mostly for demos and tests.
    pub fn credit(&self, user_id: &str, amount: i64) {
        let mut accounts = self.accounts.write().unwrap();
        *accounts.entry(user_id.to_string()).or_insert(0) += amount;
    }

    /// Snapshot of every account, sorted by user id.
    pub fn balances(&self) -> Vec<(String, i64)> {
        let accounts = self.accounts.read().unwrap();
        let mut all: Vec<_> = accounts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn adjust(&self, user_id: &str, delta: i64) -> Result<i64, LedgerError> {
        let mut accounts = self.accounts.write().unwrap();
        let balance = accounts.entry(user_id.to_string()).or_insert(0);
        *balance += delta;
        Ok(*balance)
    }

    async fn balance(&self, user_id: &str) -> Result<i64, LedgerError> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.get(user_id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_adjust_accumulates() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.adjust("u1", 50).await.unwrap(), 50);
        assert_eq!(ledger.adjust("u1", -20).await.unwrap(), 30);
        assert_eq!(ledger.balance("u1").await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_unknown_account_reads_zero() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.balance("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_debit_below_zero_is_allowed() {
        let ledger = InMemoryLedger::new();
        ledger.credit("u1", 10);
        assert_eq!(ledger.adjust("u1", -25).await.unwrap(), -15);
    }
}

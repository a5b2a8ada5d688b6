//! Live match registry
//!
//! One entry per running match. The runtime sits behind a tokio Mutex so
//! actions for a match apply strictly one at a time; the atomics carry
//! scheduling state that must stay readable without taking that lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::domain::match_runtime::MatchRuntime;

pub struct MatchEntry {
    pub runtime: Mutex<MatchRuntime>,
    /// Set while a bot decision cycle is in flight for this match.
    bot_cycle: AtomicBool,
    /// Unix millis of the most recent applied action.
    last_action_at: AtomicI64,
}

impl MatchEntry {
    pub fn new(runtime: MatchRuntime) -> Self {
        Self {
            runtime: Mutex::new(runtime),
            bot_cycle: AtomicBool::new(false),
            last_action_at: AtomicI64::new(chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Claims the bot cycle slot. Returns false when a cycle already runs.
    pub fn claim_bot_cycle(&self) -> bool {
        self.bot_cycle
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release_bot_cycle(&self) {
        self.bot_cycle.store(false, Ordering::Release);
    }

    /// Resets the idle clock.
    pub fn touch(&self) {
        self.last_action_at
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn idle_for(&self) -> Duration {
        let last = self.last_action_at.load(Ordering::Relaxed);
        let now = chrono::Utc::now().timestamp_millis();
        Duration::from_millis((now - last).max(0) as u64)
    }
}

#[derive(Default)]
pub struct MatchRegistry {
    matches: RwLock<HashMap<String, Arc<MatchEntry>>>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, match_id: String, entry: Arc<MatchEntry>) {
        let mut matches = self.matches.write().await;
        matches.insert(match_id, entry);
    }

    pub async fn get(&self, match_id: &str) -> Option<Arc<MatchEntry>> {
        let matches = self.matches.read().await;
        matches.get(match_id).cloned()
    }

    pub async fn remove(&self, match_id: &str) -> Option<Arc<MatchEntry>> {
        let mut matches = self.matches.write().await;
        matches.remove(match_id)
    }

    /// Ids of every registered match, for sweeps.
    pub async fn ids(&self) -> Vec<String> {
        let matches = self.matches.read().await;
        matches.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        let matches = self.matches.read().await;
        matches.len()
    }
}

//! Shared application state
//!
//! Wires the registry, ledger and presenter together with the runtime
//! tunables. Cloning is cheap; every part is behind an Arc.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ledger::InMemoryLedger;
use crate::infrastructure::presenter::BroadcastPresenter;
use crate::infrastructure::registry::MatchRegistry;

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Delay before a bot commits to a decision.
    pub bot_think: Duration,
    /// Delay between consecutive bot actions in one match.
    pub bot_pace: Duration,
    /// A match with no action for this long gets swept.
    pub idle_timeout: Duration,
    /// How long a finished match stays visible before teardown.
    pub teardown_grace: Duration,
    /// Period of the idle sweep.
    pub sweep_interval: Duration,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            bot_think: Duration::from_millis(env_u64("CARDROOM_BOT_THINK_MS", 300)),
            bot_pace: Duration::from_millis(env_u64("CARDROOM_BOT_PACE_MS", 200)),
            idle_timeout: Duration::from_secs(env_u64("CARDROOM_IDLE_TIMEOUT_SECS", 120)),
            teardown_grace: Duration::from_secs(env_u64("CARDROOM_TEARDOWN_GRACE_SECS", 30)),
            sweep_interval: Duration::from_secs(env_u64("CARDROOM_SWEEP_INTERVAL_SECS", 15)),
        }
    }

    /// Zero-delay profile for tests and quick demos.
    pub fn instant() -> Self {
        Self {
            bot_think: Duration::ZERO,
            bot_pace: Duration::ZERO,
            idle_timeout: Duration::from_secs(300),
            teardown_grace: Duration::ZERO,
            sweep_interval: Duration::from_secs(300),
        }
    }
}

/// Application state shared across the host and every running match
#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub registry: Arc<MatchRegistry>,
    pub ledger: Arc<InMemoryLedger>,
    pub presenter: Arc<BroadcastPresenter>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            registry: Arc::new(MatchRegistry::new()),
            ledger: Arc::new(InMemoryLedger::new()),
            presenter: Arc::new(BroadcastPresenter::new(256)),
        }
    }
}

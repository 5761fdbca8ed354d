//! Engine configuration
//!
//! Zero durations are never valid; constructors fall back to the defaults and
//! log a warning instead of failing.

use std::time::Duration;

use tracing::warn;

/// Ceiling for a single store round-trip
pub const DEFAULT_STORE_DEADLINE: Duration = Duration::from_secs(30);

/// Expiration sweep period
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings shared by every request-path component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deadline applied to each store call; exceeding it fails `Unavailable`
    pub store_deadline: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_deadline: DEFAULT_STORE_DEADLINE,
        }
    }
}

impl EngineConfig {
    pub fn new(store_deadline: Duration) -> Self {
        Self {
            store_deadline: non_zero_or_default(
                "store_deadline",
                store_deadline,
                DEFAULT_STORE_DEADLINE,
            ),
        }
    }
}

/// Settings for the expiration sweep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Time between sweeps
    pub interval: Duration,
    /// Deadline for the bulk store update
    pub deadline: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
            deadline: DEFAULT_STORE_DEADLINE,
        }
    }
}

impl SweepConfig {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self {
            interval: non_zero_or_default("sweep_interval", interval, DEFAULT_SWEEP_INTERVAL),
            deadline: non_zero_or_default("sweep_deadline", deadline, DEFAULT_STORE_DEADLINE),
        }
    }
}

fn non_zero_or_default(name: &str, value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        warn!(setting = name, default = ?default, "Invalid zero duration, using default");
        default
    } else {
        value
    }
}

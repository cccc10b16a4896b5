//! Settlement tuning knobs.

use std::time::Duration;

/// Timeouts applied to counterparty round trips. Expiry of any of them
/// aborts the whole flow; partial settlement is never left behind.
#[derive(Clone, Copy, Debug)]
pub struct SettlementConfig {
    /// Window for a countersigning or trade-candidate round trip.
    pub exchange_timeout: Duration,
    /// Window for oracle registration and key-release round trips.
    pub oracle_timeout: Duration,
    /// Window for a post-commit distribution acknowledgement. Expiry is
    /// logged, not fatal: the transaction is already committed.
    pub notify_timeout: Duration,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            exchange_timeout: Duration::from_secs(10),
            oracle_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(5),
        }
    }
}

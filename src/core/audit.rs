//! Audit sink implementations
//!
//! - [`TracingAuditSink`] emits one structured `tracing` event per mutation
//!   under the `economy::audit` target, so a subscriber can route the audit
//!   trail separately from operational logs.
//! - [`MemoryAuditSink`] keeps events in memory for tests and reconciliation.

use std::sync::Mutex;

use tracing::info;

use super::traits::AuditSink;
use crate::types::AuditEvent;

/// Audit sink backed by `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            target: "economy::audit",
            user_id = %event.user_id,
            counter = %event.counter,
            delta = event.delta,
            resulting_balance = event.resulting_balance,
            reason = ?event.reason,
            timestamp = %event.timestamp.to_rfc3339(),
            "balance mutation"
        );
    }
}

/// Audit sink that retains every event in arrival order
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events recorded so far
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

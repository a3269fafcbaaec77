//! Stale-response guard for list fetches.
//!
//! Every fetch takes a fresh [`RequestId`]. Starting a new fetch supersedes the
//! previous one, so when responses arrive out of order only the newest is
//! applied.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out request ids and remembers which one is current.
#[derive(Debug, Default)]
pub struct LatestOnly {
    issued: u64,
    pending: Option<RequestId>,
}

impl LatestOnly {
    /// Issues an id for a new fetch. Any fetch still pending becomes stale.
    pub fn begin(&mut self) -> RequestId {
        let id = RequestId(self.issued);
        self.issued = self.issued.wrapping_add(1);
        if let Some(stale) = self.pending.replace(id) {
            tracing::debug!(%stale, current = %id, "superseding pending request");
        }
        id
    }

    /// Drops the pending fetch; its response will be treated as stale.
    pub fn cancel(&mut self) {
        if let Some(stale) = self.pending.take() {
            tracing::debug!(%stale, "pending request cancelled");
        }
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.pending == Some(id)
    }

    /// Whether a fetch is still waiting for its response.
    pub fn has_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Settles `id` if it is current. Returns false for stale ids.
    pub fn finish_if_active(&mut self, id: RequestId) -> bool {
        let current = self.is_current(id);
        if current {
            self.pending = None;
        }
        current
    }
}

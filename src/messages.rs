//! Transient messages
//!
//! A [`MessageSlot`] holds at most one user-facing message. A message may
//! carry a scheduled clear; setting a new message or clearing the slot
//! cancels the pending clear, so a stale expiry never wipes a newer message.

use std::time::{Duration, Instant};

/// A pending clear of a message slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledClear {
    id: u64,
    deadline: Instant,
}

impl ScheduledClear {
    /// When the message should be cleared.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// A single transient message with an optional scheduled clear.
#[derive(Debug, Clone, Default)]
pub struct MessageSlot {
    text: String,
    pending: Option<ScheduledClear>,
    next_id: u64,
}

impl MessageSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current message, empty when there is none.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the slot holds no message.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The pending clear, if one is scheduled.
    pub fn pending(&self) -> Option<ScheduledClear> {
        self.pending
    }

    /// Replace the message without scheduling a clear. Any pending clear is
    /// cancelled.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.pending = None;
    }

    /// Replace the message and schedule it to clear `ttl` after `now`. Any
    /// pending clear is cancelled.
    pub fn set_expiring(
        &mut self,
        text: impl Into<String>,
        now: Instant,
        ttl: Duration,
    ) -> ScheduledClear {
        self.text = text.into();
        self.next_id = self.next_id.wrapping_add(1);

        let scheduled = ScheduledClear {
            id: self.next_id,
            deadline: now.checked_add(ttl).unwrap_or(now),
        };

        self.pending = Some(scheduled);

        scheduled
    }

    /// Clear the message and cancel any pending clear.
    pub fn clear(&mut self) {
        self.text.clear();
        self.pending = None;
    }

    /// Run a scheduled clear. Only clears if `scheduled` is still the pending
    /// clear for this slot; returns whether the message was cleared.
    pub fn fire(&mut self, scheduled: ScheduledClear) -> bool {
        if !self.pending.is_some_and(|pending| pending.id == scheduled.id) {
            return false;
        }

        self.clear();

        true
    }

    /// Clear the message if its pending clear is due at `now`; returns whether
    /// the message was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(scheduled) if scheduled.deadline <= now => self.fire(scheduled),
            _ => false,
        }
    }
}

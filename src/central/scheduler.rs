//! Connection Scheduler
//!
//! BLE link-layer hardware accepts a single outstanding connection attempt.
//! The scheduler owns the pending-attempt sentinel and a strict FIFO queue
//! of deferred requests; the orchestrator drains one entry per completion
//! event.

use std::collections::VecDeque;

use crate::domain::models::{ConnectionParameters, PeripheralId};

/// A deferred connection request, kept with the parameters it was issued
/// with so a later drain re-issues exactly what the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedConnection {
    pub peripheral: PeripheralId,
    pub parameters: ConnectionParameters,
}

#[derive(Debug, Default)]
pub struct ConnectionScheduler {
    pending: Option<PeripheralId>,
    queue: VecDeque<QueuedConnection>,
}

impl ConnectionScheduler {
    /// Whether a CreateConnection command is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PeripheralId> {
        self.pending.as_ref()
    }

    /// Marks an attempt as outstanding. Callers check [`is_busy`](Self::is_busy)
    /// first; beginning over an existing attempt would violate the
    /// single-outstanding constraint.
    pub fn begin(&mut self, peripheral: PeripheralId) {
        self.pending = Some(peripheral);
    }

    pub fn enqueue(&mut self, peripheral: PeripheralId, parameters: ConnectionParameters) {
        self.queue.push_back(QueuedConnection {
            peripheral,
            parameters,
        });
    }

    /// Clears the outstanding attempt, returning the peripheral it was for.
    /// `None` means the completion event was stale.
    pub fn take_pending(&mut self) -> Option<PeripheralId> {
        self.pending.take()
    }

    /// Pops the next deferred request in FIFO order.
    pub fn next_queued(&mut self) -> Option<QueuedConnection> {
        self.queue.pop_front()
    }

    /// Removes the first queued request for `peripheral`, if any. With
    /// duplicate requests queued, exactly one is removed per call.
    pub fn cancel_queued(&mut self, peripheral: &PeripheralId) -> Option<QueuedConnection> {
        let position = self
            .queue
            .iter()
            .position(|entry| &entry.peripheral == peripheral)?;
        self.queue.remove(position)
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PeripheralId {
        PeripheralId::new(s)
    }

    #[test]
    fn queue_is_drained_in_fifo_order() {
        let mut scheduler = ConnectionScheduler::default();
        scheduler.begin(id("first"));
        scheduler.enqueue(id("second"), ConnectionParameters::default());
        scheduler.enqueue(id("third"), ConnectionParameters::default());

        assert_eq!(scheduler.take_pending(), Some(id("first")));
        assert_eq!(scheduler.next_queued().unwrap().peripheral, id("second"));
        assert_eq!(scheduler.next_queued().unwrap().peripheral, id("third"));
        assert!(scheduler.next_queued().is_none());
    }

    #[test]
    fn duplicate_requests_queue_independently() {
        let mut scheduler = ConnectionScheduler::default();
        scheduler.begin(id("dup"));
        scheduler.enqueue(id("dup"), ConnectionParameters::default());
        scheduler.enqueue(id("dup"), ConnectionParameters::default());
        assert_eq!(scheduler.queued_len(), 2);
    }

    #[test]
    fn cancel_removes_exactly_one_matching_entry() {
        let mut scheduler = ConnectionScheduler::default();
        let custom = ConnectionParameters {
            min_interval: Some(0x0010),
            ..ConnectionParameters::default()
        };
        scheduler.enqueue(id("dup"), custom);
        scheduler.enqueue(id("other"), ConnectionParameters::default());
        scheduler.enqueue(id("dup"), ConnectionParameters::default());

        let removed = scheduler.cancel_queued(&id("dup")).unwrap();
        assert_eq!(removed.parameters.min_interval, Some(0x0010));
        assert_eq!(scheduler.queued_len(), 2);

        // The later duplicate is still serviceable.
        assert_eq!(scheduler.next_queued().unwrap().peripheral, id("other"));
        assert_eq!(scheduler.next_queued().unwrap().peripheral, id("dup"));
    }

    #[test]
    fn cancel_of_an_unqueued_peripheral_is_a_no_op() {
        let mut scheduler = ConnectionScheduler::default();
        scheduler.enqueue(id("queued"), ConnectionParameters::default());
        assert!(scheduler.cancel_queued(&id("absent")).is_none());
        assert_eq!(scheduler.queued_len(), 1);
    }

    #[test]
    fn take_pending_leaves_the_scheduler_idle() {
        let mut scheduler = ConnectionScheduler::default();
        scheduler.begin(id("peer"));
        assert!(scheduler.is_busy());
        assert_eq!(scheduler.take_pending(), Some(id("peer")));
        assert!(!scheduler.is_busy());
        assert!(scheduler.take_pending().is_none());
    }
}

//! Loading state and stale-completion guard for async UI operations.
//!
//! `OpState` tracks whether a surface is busy so it can show a disabled state.
//! `OpTracker` derives it from every operation in flight, so overlapping
//! operations keep the surface busy until the last one finishes.
//! `StaleGuard` lets a completion check that nothing newer (or an unmount)
//! happened while it was in flight before it touches shared state.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Operations that put a surface into a loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SignIn,
    Register,
    UpdateProfile,
    Upload,
    LoadEvents,
    SaveEvent,
    DeleteEvent,
}

/// Operation state for one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpState {
    #[default]
    Idle,
    Busy(Operation),
}

impl OpState {
    /// True if a new operation can be started.
    pub fn can_start(self) -> bool {
        matches!(self, OpState::Idle)
    }

    /// True while something is in flight; the UI disables its controls.
    pub fn is_loading(self) -> bool {
        !self.can_start()
    }

    /// The operation currently running, if any.
    pub fn current(self) -> Option<Operation> {
        match self {
            OpState::Idle => None,
            OpState::Busy(op) => Some(op),
        }
    }

    /// State after an operation completes, successfully or not.
    pub fn on_done(self) -> Self {
        OpState::Idle
    }
}

/// Operations in flight on one surface.
#[derive(Debug, Default)]
pub struct OpTracker {
    in_flight: Mutex<Vec<Operation>>,
}

impl OpTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `op` as running until the returned guard is dropped.
    pub fn begin(&self, op: Operation) -> OpGuard<'_> {
        self.in_flight.lock().push(op);
        OpGuard { tracker: self, op }
    }

    /// Busy with the most recently started operation still running.
    pub fn state(&self) -> OpState {
        self.in_flight
            .lock()
            .last()
            .map_or(OpState::Idle, |op| OpState::Busy(*op))
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// Ends its operation on drop, including on early return or error.
#[must_use = "the operation ends when the guard is dropped"]
#[derive(Debug)]
pub struct OpGuard<'a> {
    tracker: &'a OpTracker,
    op: Operation,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.tracker.in_flight.lock();
        if let Some(index) = in_flight.iter().rposition(|op| *op == self.op) {
            in_flight.remove(index);
        }
    }
}

/// Generation token handed out by [`StaleGuard::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Discards completions that were overtaken by a newer request or an unmount.
#[derive(Debug, Default)]
pub struct StaleGuard {
    generation: AtomicU64,
}

impl StaleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Any earlier ticket becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Observe the current generation without superseding earlier tickets.
    pub fn current(&self) -> Ticket {
        Ticket(self.generation.load(Ordering::SeqCst))
    }

    /// Whether a completion holding `ticket` may still apply its result.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Make every outstanding ticket stale (owner unmounted or switched user).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_allows_start() {
        let s = OpState::Idle;
        assert!(s.can_start());
        assert!(!s.is_loading());
        assert_eq!(s.current(), None);
    }

    #[test]
    fn busy_blocks_start() {
        let s = OpState::Busy(Operation::SignIn);
        assert!(!s.can_start());
        assert!(s.is_loading());
        assert_eq!(s.current(), Some(Operation::SignIn));
    }

    #[test]
    fn done_transitions_to_idle() {
        assert_eq!(OpState::Busy(Operation::SaveEvent).on_done(), OpState::Idle);
    }

    #[test]
    fn tracker_stays_busy_until_last_operation_ends() {
        let tracker = OpTracker::new();
        let load = tracker.begin(Operation::LoadEvents);
        let save = tracker.begin(Operation::SaveEvent);
        assert_eq!(tracker.state(), OpState::Busy(Operation::SaveEvent));

        drop(save);
        assert_eq!(tracker.state(), OpState::Busy(Operation::LoadEvents));
        assert_eq!(tracker.in_flight(), 1);

        drop(load);
        assert_eq!(tracker.state(), OpState::Idle);
        assert!(!tracker.is_loading());
    }

    #[test]
    fn newer_ticket_makes_older_stale() {
        let guard = StaleGuard::new();
        let first = guard.begin();
        assert!(guard.is_current(first));
        let second = guard.begin();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn observing_does_not_supersede() {
        let guard = StaleGuard::new();
        let load = guard.begin();
        let observed = guard.current();
        assert!(guard.is_current(load));
        assert!(guard.is_current(observed));
        guard.invalidate();
        assert!(!guard.is_current(observed));
    }

    #[test]
    fn invalidate_makes_all_stale() {
        let guard = StaleGuard::new();
        let ticket = guard.begin();
        guard.invalidate();
        assert!(!guard.is_current(ticket));
    }
}

//! Arrival-ordered mutual exclusion for channel deliveries.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Lets one delivery through at a time, in the order callers arrived.
///
/// Each caller draws a ticket on entry and waits until that ticket is being
/// served. Waiting callers sleep on a condition variable; only the caller
/// holding the current turn owns the channel.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    state: Mutex<GateState>,
    turn: Condvar,
}

#[derive(Debug, Default)]
struct GateState {
    next_ticket: u64,
    now_serving: u64,
}

impl SubmissionGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for this caller's turn.
    ///
    /// The turn passes to the next ticket when the returned guard is dropped,
    /// including during unwinding.
    pub fn enter(&self) -> GateGuard<'_> {
        let mut state = self.lock_state();
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        while state.now_serving != ticket {
            state = self
                .turn
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        GateGuard { gate: self, ticket }
    }

    /// Callers holding or waiting for a turn.
    pub fn occupancy(&self) -> u64 {
        let state = self.lock_state();
        state.next_ticket - state.now_serving
    }

    fn leave(&self) {
        let mut state = self.lock_state();
        state.now_serving += 1;
        drop(state);
        self.turn.notify_all();
    }

    // The state mutex only guards two counters and is never held across user
    // code, so a poisoned lock still holds consistent data.
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held turn at the [`SubmissionGate`].
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a SubmissionGate,
    ticket: u64,
}

impl GateGuard<'_> {
    /// Position of this turn in the gate's arrival order, starting at zero.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}

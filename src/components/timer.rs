//! Single-shot deferred timer keyed by a generation counter.
//!
//! Every `schedule` bumps the generation and replaces whatever was pending, so
//! at most one task is live per timer. Owners poll the timer with the current
//! clock; a poll only fires a task whose generation is still current, which
//! turns a late or superseded firing into a no-op.

/// Handle identifying one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    ticket: TimerTicket,
    due_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredTimer {
    generation: u64,
    pending: Option<Pending>,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a firing `delay_ms` after `now_ms`, cancelling any pending one.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64) -> TimerTicket {
        self.generation += 1;
        let ticket = TimerTicket(self.generation);
        self.pending = Some(Pending {
            ticket,
            due_ms: now_ms.saturating_add(delay_ms),
        });
        ticket
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms)
    }

    /// Whether `ticket` still refers to the live task.
    pub fn is_current(&self, ticket: TimerTicket) -> bool {
        self.pending.is_some_and(|p| p.ticket == ticket)
    }

    /// Fire the pending task if it is due. Returns its ticket once.
    pub fn poll(&mut self, now_ms: u64) -> Option<TimerTicket> {
        match self.pending {
            Some(p) if p.ticket.0 == self.generation && now_ms >= p.due_ms => {
                self.pending = None;
                Some(p.ticket)
            }
            _ => None,
        }
    }
}

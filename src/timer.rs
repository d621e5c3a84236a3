//! Countdown timer gated on the first keystroke, and the cancellable tick
//! handles that drive it.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Expired,
}

/// What a single tick did to the timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running; nothing changed
    Ignored,
    Advanced { elapsed_secs: u32 },
    /// The tick that reached the duration
    Expired,
}

/// Countdown state machine: `Idle -> Running -> Expired`, back to `Idle` on reset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    duration_secs: u32,
    elapsed_secs: u32,
    phase: Phase,
}

impl Timer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            elapsed_secs: 0,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.duration_secs - self.elapsed_secs
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn has_expired(&self) -> bool {
        self.phase == Phase::Expired
    }

    /// Idle -> Running. Returns false if the timer had already left Idle.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Running;
        true
    }

    pub fn on_tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Ignored;
        }

        self.elapsed_secs = (self.elapsed_secs + 1).min(self.duration_secs);
        if self.elapsed_secs == self.duration_secs {
            self.phase = Phase::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Advanced {
                elapsed_secs: self.elapsed_secs,
            }
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
        self.phase = Phase::Idle;
    }
}

/// Identifies the tick stream a `Tick` event belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// Process wide unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TickId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Owned handle to a scheduled one-second tick stream.
///
/// Cancelling (explicitly or by dropping) stops the scheduler from producing
/// more ticks. Ticks already in flight still carry the old id and are
/// rejected by the session.
#[derive(Debug)]
pub struct TickHandle {
    id: TickId,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn new(id: TickId) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Flag shared with whatever produces the ticks
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Starts tick streams on behalf of a session
pub trait TickScheduler: Send {
    fn schedule(&mut self) -> TickHandle;
}

/// Scheduler that produces nothing by itself; tests deliver ticks by hand.
/// Remembers the cancellation flag of every handle it gave out.
#[derive(Debug, Default, Clone)]
pub struct ManualTickScheduler {
    issued: Arc<std::sync::Mutex<Vec<(TickId, Arc<AtomicBool>)>>>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every handle issued so far, oldest first
    pub fn issued(&self) -> Vec<TickId> {
        self.lock().iter().map(|(id, _)| *id).collect()
    }

    pub fn last_issued(&self) -> Option<TickId> {
        self.lock().last().map(|(id, _)| *id)
    }

    pub fn is_cancelled(&self, id: TickId) -> bool {
        self.lock()
            .iter()
            .find(|(issued, _)| *issued == id)
            .map(|(_, flag)| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(TickId, Arc<AtomicBool>)>> {
        // a poisoned list is still a valid list
        self.issued.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(&mut self) -> TickHandle {
        let handle = TickHandle::new(TickId::next());
        self.lock().push((handle.id(), handle.cancel_flag()));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_new() {
        let timer = Timer::new(30);

        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.elapsed_secs(), 0);
        assert_eq!(timer.seconds_remaining(), 30);
        assert!(!timer.has_started());
    }

    #[test]
    fn test_tick_while_idle_is_ignored() {
        let mut timer = Timer::new(30);

        assert_eq!(timer.on_tick(), TickOutcome::Ignored);
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn test_start_only_once() {
        let mut timer = Timer::new(30);

        assert!(timer.start());
        assert!(!timer.start());
        assert_eq!(timer.phase(), Phase::Running);
    }

    #[test]
    fn test_runs_to_expiry() {
        let mut timer = Timer::new(3);
        timer.start();

        assert_eq!(timer.on_tick(), TickOutcome::Advanced { elapsed_secs: 1 });
        assert_eq!(timer.on_tick(), TickOutcome::Advanced { elapsed_secs: 2 });
        assert_eq!(timer.on_tick(), TickOutcome::Expired);
        assert_eq!(timer.phase(), Phase::Expired);
        assert_eq!(timer.seconds_remaining(), 0);
    }

    #[test]
    fn test_late_ticks_are_clamped() {
        let mut timer = Timer::new(2);
        timer.start();

        for _ in 0..10 {
            timer.on_tick();
        }

        assert_eq!(timer.elapsed_secs(), 2);
        assert_eq!(timer.phase(), Phase::Expired);
        assert!(!timer.start());
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut timer = Timer::new(1);
        timer.start();
        timer.on_tick();
        assert!(timer.has_expired());

        timer.reset();

        assert_eq!(timer, Timer::new(1));
        assert!(timer.start());
    }

    #[test]
    fn test_tick_ids_are_unique() {
        assert_ne!(TickId::next(), TickId::next());
    }

    #[test]
    fn test_handle_cancels_on_drop() {
        let handle = TickHandle::new(TickId::next());
        let flag = handle.cancel_flag();

        assert!(!flag.load(Ordering::SeqCst));
        drop(handle);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_manual_scheduler_tracks_handles() {
        let mut scheduler = ManualTickScheduler::new();

        let first = scheduler.schedule();
        let second = scheduler.schedule();
        assert_eq!(scheduler.issued(), vec![first.id(), second.id()]);

        first.cancel();
        assert!(scheduler.is_cancelled(first.id()));
        assert!(!scheduler.is_cancelled(second.id()));
    }
}

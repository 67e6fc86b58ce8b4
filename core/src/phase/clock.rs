//! The seed cycle phase clock.
//!
//! `PhaseClock` holds the encounter state behind one mutex. Trigger methods
//! are called from the log tailer's worker thread, `update_display` from the
//! driver's timer; every public method takes the lock once, does memory-only
//! work, and releases it before the display sink runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::display::{DisplaySink, NullSink, PhaseDisplay};
use super::phases::{self, CycleSnapshot};
use super::state::EncounterState;
use super::timings::{CYCLE_DURATION, DOUBLE_SEED_MAX_GAP, DOUBLE_SEED_MIN_GAP};
use super::TriggerSink;

/// Monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Shared between clones.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Classifies time since the last seed into display phases.
pub struct PhaseClock<C: Clock = SystemClock> {
    state: Mutex<EncounterState>,
    sink: RwLock<Arc<dyn DisplaySink>>,
    clock: C,
}

impl PhaseClock<SystemClock> {
    pub fn new(sink: impl DisplaySink + 'static) -> Self {
        Self::with_clock(sink, SystemClock)
    }
}

impl Default for PhaseClock<SystemClock> {
    fn default() -> Self {
        Self::new(NullSink)
    }
}

impl<C: Clock> PhaseClock<C> {
    pub fn with_clock(sink: impl DisplaySink + 'static, clock: C) -> Self {
        let sink: Arc<dyn DisplaySink> = Arc::new(sink);
        Self {
            state: Mutex::new(EncounterState::default()),
            sink: RwLock::new(sink),
            clock,
        }
    }

    /// Replace the display sink.
    pub fn set_sink(&self, sink: impl DisplaySink + 'static) {
        let sink: Arc<dyn DisplaySink> = Arc::new(sink);
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = sink;
    }

    fn state(&self) -> MutexGuard<'_, EncounterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, display: &PhaseDisplay) {
        let sink = Arc::clone(&self.sink.read().unwrap_or_else(PoisonError::into_inner));
        sink.show(display);
    }

    // ─── Triggers ───────────────────────────────────────────────────────────

    /// Start a new cycle for `actor`.
    ///
    /// A re-trigger for the same actor 5-12s into a running cycle does not
    /// restart the clock; it switches the cycle into the double-seed branch.
    pub fn start_cycle(&self, actor: impl Into<String>) {
        let actor = actor.into();
        let now = self.clock.now();
        let mut state = self.state();

        state.interrupt_active = false;

        if state.active
            && state.primary_actor.as_deref() == Some(actor.as_str())
            && let Some(start) = state.cycle_start
        {
            let gap = now.saturating_duration_since(start);
            let window = Duration::from_secs(DOUBLE_SEED_MIN_GAP)
                ..=Duration::from_secs(DOUBLE_SEED_MAX_GAP);
            if window.contains(&gap) {
                state.branch_mode = true;
                state.branch_secondary_active = true;
                tracing::debug!(
                    actor = %actor,
                    gap_ms = gap.as_millis() as u64,
                    "Double seed detected"
                );
                return;
            }
        }

        tracing::debug!(actor = %actor, "Seed cycle started");
        state.begin_cycle(actor, now);
    }

    /// Stop the current cycle and show the waiting display. Idempotent.
    pub fn stop_cycle(&self) {
        self.state().clear_cycle();
        self.emit(&PhaseDisplay::waiting());
    }

    /// Syphon overrides everything until the next seed.
    pub fn start_syphon(&self) {
        let mut state = self.state();
        state.interrupt_active = true;
        state.active = false;
        state.cycle_start = None;
        tracing::debug!("Syphon started");
    }

    /// Full fight reset (boss death or wipe).
    pub fn reset_fight(&self) {
        *self.state() = EncounterState::default();
        self.emit(&PhaseDisplay::waiting());
    }

    /// Record the fixation target.
    ///
    /// While idle this is recorded silently and has no visible effect.
    pub fn update_fixation(&self, actor: impl Into<String>) {
        let actor = actor.into();
        let mut state = self.state();
        tracing::debug!(actor = %actor, active = state.active, "Fixation recorded");
        state.secondary_seen = true;
        state.secondary_actor = Some(actor);
    }

    // ─── Polling ────────────────────────────────────────────────────────────

    /// Compute the display for the current instant.
    ///
    /// Returns `None` when idle. When the cycle has run its full length it is
    /// ended here: the waiting display is pushed to the sink and `None` is
    /// returned.
    pub fn get_current_phase(&self) -> Option<PhaseDisplay> {
        let now = self.clock.now();

        let snapshot = {
            let mut state = self.state();

            if state.interrupt_active {
                return Some(phases::syphon_display());
            }

            let start = match (state.active, state.cycle_start) {
                (true, Some(start)) => start,
                _ => return None,
            };

            let elapsed = now.saturating_duration_since(start);
            if elapsed >= Duration::from_secs(CYCLE_DURATION) {
                state.clear_cycle();
                None
            } else {
                Some(CycleSnapshot {
                    elapsed: elapsed.as_secs(),
                    primary_actor: state.primary_actor.clone(),
                    secondary_actor: state.secondary_actor.clone(),
                    primary_seen: state.primary_seen,
                    secondary_seen: state.secondary_seen,
                    branch_mode: state.branch_mode,
                })
            }
        };

        match snapshot {
            Some(snapshot) => Some(phases::build(&snapshot)),
            None => {
                tracing::debug!("Seed cycle complete");
                self.emit(&PhaseDisplay::waiting());
                None
            }
        }
    }

    /// Compute the current phase and push it to the sink.
    ///
    /// Meant to be called on a fixed interval (50ms works well).
    pub fn update_display(&self) {
        if let Some(display) = self.get_current_phase() {
            self.emit(&display);
        }
    }

    // ─── Observers ──────────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.state().active
    }

    /// Copy of the current encounter state.
    pub fn snapshot(&self) -> EncounterState {
        self.state().clone()
    }
}

impl<C: Clock> TriggerSink for PhaseClock<C> {
    fn start_cycle(&self, actor: String) {
        PhaseClock::start_cycle(self, actor);
    }

    fn update_fixation(&self, actor: String) {
        PhaseClock::update_fixation(self, actor);
    }

    fn start_syphon(&self) {
        PhaseClock::start_syphon(self);
    }
}

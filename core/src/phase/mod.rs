//! Boss encounter phase tracking.
//!
//! [`PhaseClock`] turns seed/fixation/syphon triggers into a two-row
//! [`PhaseDisplay`] that a driver polls on a short interval.

mod clock;
mod display;
pub mod phases;
mod state;
pub mod timings;


pub use clock::{Clock, PhaseClock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use display::{DisplaySink, NullSink, PhaseDisplay, PhaseRow, WAITING_MESSAGE};
pub use phases::{CycleSnapshot, PhaseSet};
pub use state::EncounterState;

/// Receiver of the encounter triggers recognized in the combat log.
pub trait TriggerSink: Send + Sync {
    /// A seed landed on `actor`
    fn start_cycle(&self, actor: String);
    /// The fixation landed on `actor`
    fn update_fixation(&self, actor: String);
    /// The boss started channeling syphon
    fn start_syphon(&self);
}

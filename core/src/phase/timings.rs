//! Ethram-Fal seed cycle timing table (whole seconds).
//!
//! A different encounter replaces this table and the builders in
//! `phases.rs`; the dispatch in `PhaseClock` stays the same.

/// How long the seed debuff lasts
pub const SEED_DURATION: u64 = 7;
/// Seconds after the seed before fixation appears
pub const FIXATION_DELAY: u64 = 4;
/// End of the seed-active display
pub const SEED_ACTIVE_END: u64 = 10;
/// Wait-for-silence display ends here
pub const SILENCE_END: u64 = 14;
/// Silence countdown target
pub const SILENCE_COUNTDOWN: u64 = 15;
/// Scorpion spawns, DPS phase starts
pub const SCORPION_SPAWN: u64 = 16;
/// Kill window opens
pub const KILL_WINDOW_START: u64 = 31;
/// Urgency marks start accumulating after this
pub const URGENCY_START: u64 = 33;
/// Kill window closes, final burn
pub const KILL_WINDOW_END: u64 = 36;
/// Full cycle length
pub const CYCLE_DURATION: u64 = 39;
/// "New Seed in N" is shown once this many seconds or fewer remain
pub const NEW_SEED_WARNING: u64 = 5;

/// Re-trigger gap (inclusive) that enters the double-seed branch
pub const DOUBLE_SEED_MIN_GAP: u64 = 5;
pub const DOUBLE_SEED_MAX_GAP: u64 = 12;
/// Second seed active until this time
pub const DOUBLE_SEED_END: u64 = 14;

/// No fixation after this many seconds means a first-seed-only cycle
pub const FIRST_SEED_THRESHOLD: u64 = 6;

/// Kill window countdown switches to alert color at this elapsed time
pub const KILL_ALERT_THRESHOLD: u64 = 28;

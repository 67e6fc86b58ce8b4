//! Phase text builders for the seed cycle.
//!
//! Every builder is a pure function of a [`CycleSnapshot`] taken under the
//! clock's lock; none of them touch shared state.

use kztracker_types::ColorToken;

use super::display::{PhaseDisplay, PhaseRow};
use super::timings::*;

pub const SYPHON_MESSAGE: &str = "Avoid the clouds";
pub const FIRST_SEED_MESSAGE: &str = "First Seed - Scorp Soon";
pub const DOUBLE_SEED_MESSAGE: &str = "P4 - Double Seed";
pub const DPS_SCORPION_MESSAGE: &str = "Dps Scorp to 5%";
pub const WAIT_SILENCE_MESSAGE: &str = "Wait for Silence";
pub const KILL_WINDOW_MESSAGE: &str = "Kill window in";
pub const KITE_MESSAGE: &str = "Kite Scorps";
pub const DONE: &str = "Done";

/// The parts of the encounter state a phase builder needs, copied out of
/// the lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSnapshot {
    /// Whole seconds since the cycle started
    pub elapsed: u64,
    pub primary_actor: Option<String>,
    pub secondary_actor: Option<String>,
    pub primary_seen: bool,
    pub secondary_seen: bool,
    pub branch_mode: bool,
}

/// Which phase set the dispatch picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSet {
    DoubleSeed,
    FirstSeedOnly,
    SeedFixation,
    KillWindow,
}

impl PhaseSet {
    /// Branch selection, in priority order.
    pub fn select(snapshot: &CycleSnapshot) -> Self {
        if snapshot.branch_mode {
            PhaseSet::DoubleSeed
        } else if snapshot.elapsed > FIRST_SEED_THRESHOLD && !snapshot.secondary_seen {
            PhaseSet::FirstSeedOnly
        } else if snapshot.elapsed <= SCORPION_SPAWN {
            PhaseSet::SeedFixation
        } else {
            PhaseSet::KillWindow
        }
    }
}

/// Build the display for a running cycle.
pub fn build(snapshot: &CycleSnapshot) -> PhaseDisplay {
    match PhaseSet::select(snapshot) {
        PhaseSet::DoubleSeed => double_seed_phase(snapshot),
        PhaseSet::FirstSeedOnly => first_seed_phase(snapshot),
        PhaseSet::SeedFixation => seed_fixation_phase(snapshot),
        PhaseSet::KillWindow => kill_window_phase(snapshot.elapsed),
    }
}

/// Fixed display while the boss is channeling syphon.
pub fn syphon_display() -> PhaseDisplay {
    PhaseDisplay {
        row1: PhaseRow::new(SYPHON_MESSAGE, ColorToken::Alert),
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn seconds(n: u64) -> String {
    format!("{n}s")
}

/// `"Ns"` while time remains, `"Done"` at zero
fn countdown(remaining: u64) -> String {
    if remaining > 0 { seconds(remaining) } else { DONE.to_string() }
}

fn display(row1: PhaseRow, row2: PhaseRow, elapsed: u64) -> PhaseDisplay {
    PhaseDisplay {
        row1,
        row2,
        cycle_timer_text: seconds(elapsed),
    }
}

/// Seed row label: `"Seed: "` plus the actor when known, bare `"Seed"` otherwise.
fn seed_row(label: &str, actor: Option<&str>) -> PhaseRow {
    match actor {
        Some(name) if !name.is_empty() => {
            PhaseRow::new(format!("{label}: "), ColorToken::Alert).actor(name)
        }
        _ => PhaseRow::new(label, ColorToken::Alert),
    }
}

/// Seconds left on the fixation, which lands `FIXATION_DELAY` after the seed.
fn fixation_remaining(elapsed: u64) -> u64 {
    let fixation_elapsed = elapsed as i64 - FIXATION_DELAY as i64;
    (SEED_DURATION as i64 - fixation_elapsed).max(0) as u64
}

fn fixation_row(actor: Option<&str>, timer: String) -> PhaseRow {
    PhaseRow::new("Fix: ", ColorToken::Active)
        .actor(actor.unwrap_or_default())
        .timer(timer)
}

// ─────────────────────────────────────────────────────────────────────────────
// First seed (no fixation coming)
// ─────────────────────────────────────────────────────────────────────────────

fn first_seed_phase(snapshot: &CycleSnapshot) -> PhaseDisplay {
    let elapsed = snapshot.elapsed;
    if elapsed <= SEED_DURATION {
        let actor = snapshot
            .primary_actor
            .as_deref()
            .filter(|_| snapshot.primary_seen);
        let row1 = seed_row("Seed", actor).timer(countdown(SEED_DURATION - elapsed));
        return display(row1, PhaseRow::default(), elapsed);
    }

    display(
        PhaseRow::new(FIRST_SEED_MESSAGE, ColorToken::Warning),
        PhaseRow::default(),
        elapsed,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Seed + fixation (0-16s)
// ─────────────────────────────────────────────────────────────────────────────

fn seed_fixation_phase(snapshot: &CycleSnapshot) -> PhaseDisplay {
    let elapsed = snapshot.elapsed;
    if elapsed <= SEED_ACTIVE_END {
        seed_active(snapshot)
    } else if elapsed <= SILENCE_END {
        wait_for_silence(snapshot)
    } else if elapsed <= SCORPION_SPAWN {
        dps_scorpion(elapsed)
    } else {
        kill_window_phase(elapsed)
    }
}

fn seed_active(snapshot: &CycleSnapshot) -> PhaseDisplay {
    let elapsed = snapshot.elapsed;
    let row1 = seed_row("Seed", snapshot.primary_actor.as_deref())
        .timer(countdown(SEED_DURATION.saturating_sub(elapsed)));

    let row2 = if snapshot.secondary_seen {
        fixation_row(
            snapshot.secondary_actor.as_deref(),
            seconds(fixation_remaining(elapsed)),
        )
    } else {
        PhaseRow::default()
    };

    display(row1, row2, elapsed)
}

fn wait_for_silence(snapshot: &CycleSnapshot) -> PhaseDisplay {
    let elapsed = snapshot.elapsed;
    let row1 = PhaseRow::new(WAIT_SILENCE_MESSAGE, ColorToken::Active)
        .timer(seconds(SILENCE_COUNTDOWN - elapsed));
    let row2 = fixation_row(
        snapshot.secondary_actor.as_deref(),
        countdown(fixation_remaining(elapsed)),
    );
    display(row1, row2, elapsed)
}

fn dps_scorpion(elapsed: u64) -> PhaseDisplay {
    display(
        PhaseRow::new(WAIT_SILENCE_MESSAGE, ColorToken::Active).timer(DONE),
        PhaseRow::new(DPS_SCORPION_MESSAGE, ColorToken::Warning),
        elapsed,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// DPS / kill window (17s+)
// ─────────────────────────────────────────────────────────────────────────────

fn urgency(elapsed: u64) -> String {
    "!".repeat(elapsed.saturating_sub(URGENCY_START) as usize)
}

fn kill_window_phase(elapsed: u64) -> PhaseDisplay {
    let new_seed_in = CYCLE_DURATION.saturating_sub(elapsed);

    if elapsed < KILL_WINDOW_START {
        let color = if elapsed >= KILL_ALERT_THRESHOLD {
            ColorToken::Alert
        } else {
            ColorToken::Warning
        };
        return display(
            PhaseRow::new(KILL_WINDOW_MESSAGE, color).timer(seconds(KILL_WINDOW_START - elapsed)),
            PhaseRow::new(DPS_SCORPION_MESSAGE, ColorToken::Warning),
            elapsed,
        );
    }

    let message = format!("Kill Scorp{}", urgency(elapsed));

    if elapsed < KILL_WINDOW_END {
        let timer = if elapsed > URGENCY_START {
            seconds(new_seed_in)
        } else {
            String::new()
        };
        return display(
            PhaseRow::new(message, ColorToken::Alert).timer(timer),
            PhaseRow::default(),
            elapsed,
        );
    }

    // Final burn, new seed imminent
    display(
        PhaseRow::new(message, ColorToken::Alert).timer(seconds(new_seed_in)),
        PhaseRow::new(format!("New Seed in {new_seed_in}"), ColorToken::Warning),
        elapsed,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Double seed (P4)
// ─────────────────────────────────────────────────────────────────────────────

fn double_seed_phase(snapshot: &CycleSnapshot) -> PhaseDisplay {
    let elapsed = snapshot.elapsed;
    let actor = snapshot.primary_actor.as_deref();
    let fixation_actor = snapshot.secondary_actor.as_deref();

    if elapsed <= SEED_DURATION {
        let row1 = seed_row("Seed", actor).timer(seconds(SEED_DURATION - elapsed));
        let row2 = if snapshot.secondary_seen && elapsed >= FIXATION_DELAY {
            fixation_row(fixation_actor, seconds(fixation_remaining(elapsed)))
        } else {
            PhaseRow::new(DOUBLE_SEED_MESSAGE, ColorToken::Warning)
        };
        return display(row1, row2, elapsed);
    }

    if elapsed <= DOUBLE_SEED_END {
        let row1 = seed_row("Seed 2", actor).timer(seconds(DOUBLE_SEED_END - elapsed));
        let row2 = if snapshot.secondary_seen {
            fixation_row(fixation_actor, countdown(fixation_remaining(elapsed)))
        } else {
            PhaseRow::default()
        };
        return display(row1, row2, elapsed);
    }

    let new_seed_in = CYCLE_DURATION.saturating_sub(elapsed);
    let row2 = if new_seed_in <= NEW_SEED_WARNING {
        PhaseRow::new(format!("New Seed in {new_seed_in}"), ColorToken::Alert)
    } else {
        PhaseRow::default()
    };
    display(PhaseRow::new(KITE_MESSAGE, ColorToken::Warning), row2, elapsed)
}

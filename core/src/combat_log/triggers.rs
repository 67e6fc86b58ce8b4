//! Trigger vocabulary of the Ethram-Fal encounter.
//!
//! These strings are the only coupling to the game's combat log format and
//! must match exactly.

use crate::phase::TriggerSink;

/// Fast pre-filter: a line mentioning none of these is ignored
pub const TRIGGER_SEED: &str = "Viscous Seed";
pub const TRIGGER_FIXATION: &str = "Lotus Fixation";
pub const TRIGGER_SYPHON: &str = "Syphon hits";

pub const SYPHON_MARKER: &str = "Ethram-Fal's Syphon hits";

pub const SEED_SOURCE: &str = "Ethram-Fal afflicts";
pub const SEED_NAME_START: &str = "afflicts";
pub const SEED_NAME_END: &str = "with Viscous Seed";

pub const FIXATION_SOURCE: &str = "The Emerald Lotus afflicts";
pub const FIXATION_NAME_END: &str = "with Lotus Fixation";

/// Present when the local player is the target
pub const TARGETS_YOU: &str = "afflicts you with";

/// Actor name used when the local player is the target
pub const YOU: &str = "YOU";
/// Actor name used when extraction fails
pub const UNKNOWN_ACTOR: &str = "Unknown";

/// A recognized encounter trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTrigger {
    Syphon,
    Seed { actor: String },
    Fixation { actor: String },
}

impl LineTrigger {
    /// Forward this trigger to the phase clock (or any other sink).
    pub fn dispatch<S: TriggerSink + ?Sized>(self, sink: &S) {
        match self {
            LineTrigger::Syphon => sink.start_syphon(),
            LineTrigger::Seed { actor } => sink.start_cycle(actor),
            LineTrigger::Fixation { actor } => sink.update_fixation(actor),
        }
    }
}

/// Cheap check run on every line before full classification.
pub fn mentions_trigger(line: &str) -> bool {
    line.contains(TRIGGER_SEED) || line.contains(TRIGGER_FIXATION) || line.contains(TRIGGER_SYPHON)
}

/// Classify a combat log line. First match wins: syphon, then seed, then
/// fixation.
pub fn classify_line(line: &str) -> Option<LineTrigger> {
    if line.contains(SYPHON_MARKER) {
        return Some(LineTrigger::Syphon);
    }

    if line.contains(SEED_SOURCE) && line.contains(SEED_NAME_END) {
        let actor = target_actor(line, SEED_NAME_START, SEED_NAME_END);
        return Some(LineTrigger::Seed { actor });
    }

    if line.contains(FIXATION_SOURCE) && line.contains(FIXATION_NAME_END) {
        let actor = target_actor(line, FIXATION_SOURCE, FIXATION_NAME_END);
        return Some(LineTrigger::Fixation { actor });
    }

    None
}

fn target_actor(line: &str, start_marker: &str, end_marker: &str) -> String {
    if line.contains(TARGETS_YOU) {
        YOU.to_string()
    } else {
        extract_actor(line, start_marker, end_marker)
    }
}

/// Trimmed text between the end of `start_marker` and the start of
/// `end_marker`, or [`UNKNOWN_ACTOR`] if either is missing or they are out
/// of order.
pub fn extract_actor(line: &str, start_marker: &str, end_marker: &str) -> String {
    let Some(start) = line.find(start_marker).map(|i| i + start_marker.len()) else {
        return UNKNOWN_ACTOR.to_string();
    };
    let Some(end) = line[start..].find(end_marker).map(|i| start + i) else {
        return UNKNOWN_ACTOR.to_string();
    };
    line[start..end].trim().to_string()
}

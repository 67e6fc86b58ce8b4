//! Phase display values and the sink they are pushed to.

use kztracker_types::ColorToken;

pub const WAITING_MESSAGE: &str = "Waiting for Seed...";

/// One row of the two-row overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseRow {
    pub message: String,
    pub actor_name: String,
    pub timer_text: String,
    pub color: ColorToken,
}

impl PhaseRow {
    pub fn new(message: impl Into<String>, color: ColorToken) -> Self {
        Self {
            message: message.into(),
            color,
            ..Default::default()
        }
    }

    pub fn actor(mut self, actor_name: impl Into<String>) -> Self {
        self.actor_name = actor_name.into();
        self
    }

    pub fn timer(mut self, timer_text: impl Into<String>) -> Self {
        self.timer_text = timer_text.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.actor_name.is_empty() && self.timer_text.is_empty()
    }
}

/// Everything the overlay shows for one poll.
///
/// Built fresh on every poll and handed straight to the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseDisplay {
    pub row1: PhaseRow,
    pub row2: PhaseRow,
    /// Overall elapsed label, e.g. `"12s"`; empty when not applicable
    pub cycle_timer_text: String,
}

impl PhaseDisplay {
    /// The idle display shown when no cycle is running.
    pub fn waiting() -> Self {
        Self {
            row1: PhaseRow::new(WAITING_MESSAGE, ColorToken::Default),
            ..Default::default()
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.row1.message == WAITING_MESSAGE
    }
}

/// Receives rendered phase displays.
///
/// Called synchronously from whichever thread triggered the update, and
/// never while the clock's lock is held.
pub trait DisplaySink: Send + Sync {
    fn show(&self, display: &PhaseDisplay);
}

impl<F> DisplaySink for F
where
    F: Fn(&PhaseDisplay) + Send + Sync,
{
    fn show(&self, display: &PhaseDisplay) {
        self(display)
    }
}

/// Sink that drops everything. Used until a real sink is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&self, _display: &PhaseDisplay) {}
}

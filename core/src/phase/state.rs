use std::time::Instant;

/// Mutable timing state of the tracked encounter.
///
/// Owned by [`PhaseClock`](super::PhaseClock) behind its mutex; the public
/// fields are only exposed through snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncounterState {
    /// A cycle is running. `cycle_start` is `Some` iff this is true.
    pub active: bool,
    pub cycle_start: Option<Instant>,

    // ─── Actors ─────────────────────────────────────────────────────────────
    /// Who received the seed ("YOU" for the local player)
    pub primary_actor: Option<String>,
    /// Who received the fixation
    pub secondary_actor: Option<String>,
    pub primary_seen: bool,
    pub secondary_seen: bool,

    // ─── Special mechanics ──────────────────────────────────────────────────
    /// Syphon in progress; masks all phase computation
    pub interrupt_active: bool,
    /// Double-seed branch, only entered through a re-trigger in `start_cycle`
    pub branch_mode: bool,
    pub branch_secondary_active: bool,
}

impl EncounterState {
    /// Clear everything tied to the running cycle. Leaves `interrupt_active` alone.
    pub(crate) fn clear_cycle(&mut self) {
        self.active = false;
        self.cycle_start = None;
        self.primary_actor = None;
        self.secondary_actor = None;
        self.primary_seen = false;
        self.secondary_seen = false;
        self.branch_mode = false;
        self.branch_secondary_active = false;
    }

    pub(crate) fn begin_cycle(&mut self, actor: String, now: Instant) {
        *self = Self {
            active: true,
            cycle_start: Some(now),
            primary_actor: Some(actor),
            primary_seen: true,
            ..Self::default()
        };
    }
}

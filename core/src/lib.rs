pub mod combat_log;
pub mod context;
pub mod phase;

// Re-exports for convenience
pub use combat_log::{LogTailer, TailerError, find_latest_log, is_combat_log};
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use phase::{
    Clock, DisplaySink, EncounterState, PhaseClock, PhaseDisplay, PhaseRow, SystemClock,
    TriggerSink,
};
#[cfg(any(test, feature = "test-util"))]
pub use phase::ManualClock;

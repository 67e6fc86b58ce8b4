mod error;
mod log_files;
mod tailer;
pub mod triggers;

#[cfg(test)]
mod tailer_tests;

pub use error::TailerError;
pub use log_files::{LOG_PREFIX, LOG_SUFFIX, file_size, find_latest_log, is_combat_log};
pub use tailer::LogTailer;
pub use triggers::{LineTrigger, classify_line, extract_actor, mentions_trigger};

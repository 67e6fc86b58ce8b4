pub mod commands;
pub mod logging;
pub mod sink;

pub use sink::TerminalSink;

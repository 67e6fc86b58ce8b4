mod config;
mod error;

pub use config::{AppConfig, AppConfigExt, OverlaySettings, TailerSettings, default_log_directory};
pub use error::ConfigError;

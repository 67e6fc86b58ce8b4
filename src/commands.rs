use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use kztracker_core::combat_log::LogTailer;
use kztracker_core::{AppConfig, AppConfigExt, PhaseClock, find_latest_log};

use crate::sink::{TerminalSink, palette_comment};

/// Shown when no combat log exists yet
const ENABLE_LOGGING_HINT: &str = "Enable combat logging in game with /logcombat on";

const TEST_SEED_ACTOR: &str = "TestPlayer";
const TEST_FIXATION_ACTOR: &str = "FixPlayer";
const TEST_FIXATION_DELAY: Duration = Duration::from_secs(4);

// ─────────────────────────────────────────────────────────────────────────────
// Live tracking
// ─────────────────────────────────────────────────────────────────────────────

pub async fn watch(
    config: &AppConfig,
    folder: Option<PathBuf>,
    file: Option<PathBuf>,
    color: bool,
) -> Result<(), String> {
    let sink = TerminalSink::stdout(color).with_overlay(&config.overlay);
    let clock = Arc::new(PhaseClock::new(sink));
    let mut tailer = LogTailer::with_settings(Arc::clone(&clock), config.tailer);

    match file {
        Some(file) => tailer.set_log_path(file),
        None => {
            let folder = folder.unwrap_or_else(|| PathBuf::from(&config.log_directory));
            if tailer.set_log_folder(&folder).is_none() {
                return Err(format!(
                    "No combat log found in {}. {ENABLE_LOGGING_HINT}",
                    folder.display()
                ));
            }
        }
    }

    tailer.start().map_err(|e| e.to_string())?;
    if let Some(path) = tailer.log_path() {
        println!("Tracking {}", path.display());
    }

    clock.reset_fight();
    drive_display(&clock, config.display_interval_ms, false).await;

    // Stop waits on the worker thread
    tokio::task::spawn_blocking(move || tailer.stop())
        .await
        .map_err(|e| e.to_string())?;
    clock.stop_cycle();
    Ok(())
}

/// Run one scripted cycle without a combat log.
pub async fn simulate(config: &AppConfig, color: bool) -> Result<(), String> {
    let sink = TerminalSink::stdout(color).with_overlay(&config.overlay);
    let clock = Arc::new(PhaseClock::new(sink));
    clock.start_cycle(TEST_SEED_ACTOR);

    let fixation = {
        let clock = Arc::clone(&clock);
        tokio::spawn(async move {
            tokio::time::sleep(TEST_FIXATION_DELAY).await;
            clock.update_fixation(TEST_FIXATION_ACTOR);
        })
    };

    drive_display(&clock, config.display_interval_ms, true).await;

    fixation.abort();
    if clock.is_active() {
        clock.stop_cycle();
    }
    Ok(())
}

/// Poll the clock until Ctrl-C, or until the cycle ends when `until_idle`.
async fn drive_display(clock: &PhaseClock, interval_ms: u64, until_idle: bool) {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                clock.update_display();
                if until_idle && !clock.is_active() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Log discovery and settings
// ─────────────────────────────────────────────────────────────────────────────

pub fn find_log(config: &AppConfig, folder: Option<PathBuf>) -> Result<(), String> {
    let folder = folder.unwrap_or_else(|| PathBuf::from(&config.log_directory));
    match find_latest_log(&folder).map_err(|e| e.to_string())? {
        Some(path) => println!("{}", path.display()),
        None => println!(
            "No combat log found in {}. {ENABLE_LOGGING_HINT}",
            folder.display()
        ),
    }
    Ok(())
}

pub fn show_config(config: &AppConfig) -> Result<(), String> {
    if let Ok(path) = AppConfig::config_path() {
        println!("# {}", path.display());
    }
    print!("{}", palette_comment());
    let text = toml::to_string_pretty(config).map_err(|e| e.to_string())?;
    print!("{text}");
    Ok(())
}

pub fn set_directory(new_directory: &Path, config: &mut AppConfig) -> Result<(), String> {
    if !new_directory.is_dir() {
        return Err("Update failed. Invalid directory name given.".to_string());
    }

    let new_directory = new_directory.to_string_lossy().into_owned();
    if new_directory == config.log_directory {
        println!("Log directory already configured to {new_directory}");
        return Ok(());
    }

    config.log_directory = new_directory;
    config.save().map_err(|e| e.to_string())?;
    println!("Log directory set to {}", config.log_directory);
    Ok(())
}

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kztracker::{commands, logging};
use kztracker_core::{AppConfig, AppConfigExt};

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let mut config = AppConfig::load();
    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command.unwrap_or(Commands::Watch {
        folder: None,
        file: None,
    }) {
        Commands::Watch { folder, file } => commands::watch(&config, folder, file, color).await,
        Commands::Simulate => commands::simulate(&config, color).await,
        Commands::FindLog { folder } => commands::find_log(&config, folder),
        Commands::Config => commands::show_config(&config),
        Commands::SetDirectory { path } => commands::set_directory(&path, &mut config),
    }
}

#[derive(Parser)]
#[command(version, about = "Ethram-Fal seed cycle tracker for Age of Conan")]
struct Cli {
    /// Plain output without ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tail the newest combat log and show the seed cycle (default)
    Watch {
        /// Game folder containing CombatLog*.txt
        #[arg(short, long, conflicts_with = "file")]
        folder: Option<PathBuf>,
        /// Tail this log file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run one test cycle without a combat log
    Simulate,
    /// Print the newest combat log
    FindLog {
        #[arg(short, long)]
        folder: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
    /// Set and save the game folder
    SetDirectory {
        #[arg(short, long)]
        path: PathBuf,
    },
}

//! Session Monitor - CLI entry point
//!
//! `smon` with no arguments opens the live view. `smon hook` is what agent
//! hooks invoke, once per lifecycle event, with the event JSON on stdin.

mod commands;

use clap::{Parser, Subcommand};
use session_monitor::config::{default, loader::ConfigLoader, xdg, Config};
use std::process::ExitCode;

/// Live view of instrumented agent sessions
#[derive(Parser)]
#[command(name = "smon")]
#[command(version, about = "Live view of instrumented agent sessions")]
struct Cli {
    /// Print one frame and exit
    #[arg(long, conflicts_with = "clean")]
    once: bool,

    /// Delete every session file and exit
    #[arg(long)]
    clean: bool,

    /// Show session ids and pids, log at debug level
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands for the smon CLI
#[derive(Subcommand)]
enum Commands {
    /// Record one agent hook event (reads JSON from stdin)
    Hook,

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Hook) => return commands::run_hook_command(),
        Some(Commands::Config { action }) => return run_config_command(action),
        None => {}
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };

    if cli.clean {
        commands::run_clean_command(&config)
    } else if cli.once {
        commands::run_once_command(&config, cli.debug)
    } else {
        commands::run_tui_command(&config, cli.debug)
    }
}

/// Loads and validates the config file, reporting problems on stderr.
fn load_config() -> Result<Config, ExitCode> {
    let config = ConfigLoader::load_default().map_err(|e| {
        eprintln!("Config error: {e}");
        ExitCode::FAILURE
    })?;
    config.validate().map_err(|e| {
        eprintln!("Config error: {e}");
        ExitCode::FAILURE
    })?;
    Ok(config)
}

fn run_config_command(action: ConfigAction) -> ExitCode {
    let result = match action {
        ConfigAction::Init { force } => match default::create_default_config(force) {
            Ok(path) => {
                println!("Created configuration at {}", path.display());
                Ok(())
            }
            Err(e) => Err(e),
        },
        ConfigAction::Path => {
            println!("{}", xdg::config_path().display());
            Ok(())
        }
        ConfigAction::Validate => {
            match ConfigLoader::load_from_path(&xdg::config_path())
                .and_then(|config| config.validate().map(|_| config))
            {
                Ok(config) => {
                    println!("Configuration is valid");
                    println!("{config:#?}");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };
    if let Err(e) = result {
        eprintln!("Config error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

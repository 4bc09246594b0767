//! Box office CLI.
//!
//! Commands:
//! - `boxoffice validate <schema> [FILE]`: validate a JSON record
//! - `boxoffice diff <ORIGINAL> <CURRENT>`: print changed values
//! - `boxoffice schemas`: list schemas
//! - `boxoffice config`: print resolved configuration
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: The record failed validation

use std::io;

use boxoffice::{commands, Cli, Commands};
use boxoffice_config::{BoxOfficeConfig, ConfigProvider};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let mut provider = ConfigProvider::from_current_dir();
    if let Some(path) = &cli.config {
        provider = provider.with_file(path);
    }
    let config = provider.load();

    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(cli.debug, &level);

    let exit_code = match config {
        Ok(config) => dispatch_command(cli.command, &config),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing(debug: bool, level: &str) {
    let filter = if debug {
        EnvFilter::new(
            "boxoffice=debug,boxoffice_forms=debug,boxoffice_validation=debug,boxoffice_config=debug",
        )
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatch a parsed command to its handler.
fn dispatch_command(command: Commands, config: &BoxOfficeConfig) -> i32 {
    let mut out = io::stdout().lock();
    match command {
        Commands::Validate { schema, file } => {
            match commands::read_input(file.as_deref())
                .and_then(|input| commands::validate(&schema, &input, &mut out))
            {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    1
                }
            }
        }
        Commands::Diff {
            original,
            current,
            exclude,
        } => result_to_exit(
            commands::read_input(Some(original.as_path()))
                .and_then(|o| commands::read_input(Some(current.as_path())).map(|c| (o, c)))
                .and_then(|(o, c)| commands::diff(&o, &c, &exclude, config, &mut out)),
        ),
        Commands::Schemas => result_to_exit(commands::schemas(&mut out)),
        Commands::Config => result_to_exit(commands::config(config, &mut out)),
    }
}

/// Convert a `Result<(), E: Display>` to an exit code.
fn result_to_exit<E: std::fmt::Display>(result: Result<(), E>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_validate_stdin() {
        let cli = Cli::parse_from(["boxoffice", "validate", "login"]);
        assert!(!cli.debug);
        match cli.command {
            Commands::Validate { schema, file } => {
                assert_eq!(schema, "login");
                assert!(file.is_none());
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parsing_debug_with_validate_file() {
        let cli = Cli::parse_from(["boxoffice", "validate", "register", "user.json", "--debug"]);
        assert!(cli.debug);
        match cli.command {
            Commands::Validate { file, .. } => {
                assert_eq!(file.unwrap().to_str(), Some("user.json"));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parsing_diff_excludes() {
        let cli = Cli::parse_from([
            "boxoffice",
            "diff",
            "before.json",
            "after.json",
            "--exclude",
            "password",
            "-e",
            "studentId",
        ]);
        match cli.command {
            Commands::Diff { exclude, .. } => assert_eq!(exclude, ["password", "studentId"]),
            _ => panic!("Expected Diff command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_file() {
        let cli = Cli::parse_from(["boxoffice", "--config", "staging.toml", "config"]);
        assert_eq!(cli.config.unwrap().to_str(), Some("staging.toml"));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["boxoffice"]).is_err());
    }

    #[test]
    fn test_result_to_exit_ok() {
        let result: Result<(), String> = Ok(());
        assert_eq!(result_to_exit(result), 0);
    }

    #[test]
    fn test_result_to_exit_err() {
        let result: Result<(), String> = Err("something failed".to_string());
        assert_eq!(result_to_exit(result), 1);
    }
}

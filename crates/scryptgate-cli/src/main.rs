#![deny(unsafe_code)]

mod commands;
mod config;
mod exit_code;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scryptgate_core::{ErrorCategory, ErrorObject};

use crate::commands::{derive, describe, validate};
use crate::config::{Config, ConfigError};

/// Scripting-host front end for scrypt parameter validation and derivation
#[derive(Parser)]
#[command(name = "scryptgate")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Check a parameter object
    scryptgate validate --params '{\"N\": 16384, \"r\": 8, \"p\": 1}'

    # Derive a 32-byte key
    echo \"$SECRET\" | scryptgate derive --password-stdin --salt-text NaCl -l 32

    # Look up a native result code
    scryptgate describe 11
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print results and error objects as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Path to config file
    #[arg(long, env = "SCRYPTGATE_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an N/r/p parameter object
    Validate(validate::Args),

    /// Derive a key from a passphrase and salt
    Derive(derive::Args),

    /// Describe native scrypt result codes
    Describe(describe::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;
    let quiet = cli.quiet;

    if !quiet {
        setup_tracing(cli.verbose);
    }

    match run(cli) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);
            if json {
                let obj = output::error_object_for(&e);
                if let Err(print_err) = output::print_json(&obj) {
                    eprintln!("Error: {e:#} (and failed to print error object: {print_err})");
                }
            } else if !quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Describe(args) => describe::execute(&args, cli.json),
        Commands::Validate(args) => {
            let config = Config::load(cli.config.as_deref())?;
            validate::execute(&args, &config, cli.json)
        }
        Commands::Derive(args) => {
            let config = Config::load(cli.config.as_deref())?;
            derive::execute(&args, &config, cli.json)
        }
    }
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();
}

fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(obj) = cause.downcast_ref::<ErrorObject>() {
            return match obj.category() {
                ErrorCategory::InternalArgument | ErrorCategory::ScriptArgument => {
                    exit_code::ARGUMENT_ERROR
                }
                ErrorCategory::Scrypt => exit_code::SCRYPT_ERROR,
                ErrorCategory::Generic => exit_code::GENERAL_ERROR,
            };
        }

        if cause.downcast_ref::<ConfigError>().is_some() {
            return exit_code::CONFIG_ERROR;
        }
    }
    exit_code::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_categorize_error() {
        let arg = anyhow::Error::new(ErrorObject::argument(ErrorCategory::ScriptArgument, "x"));
        assert_eq!(categorize_error(&arg), exit_code::ARGUMENT_ERROR);

        let scrypt = anyhow::Error::new(ErrorObject::scrypt(ErrorCategory::Scrypt, 3));
        assert_eq!(categorize_error(&scrypt), exit_code::SCRYPT_ERROR);

        let config = anyhow::Error::new(ConfigError::ParamsJson(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        ));
        assert_eq!(categorize_error(&config), exit_code::CONFIG_ERROR);

        assert_eq!(categorize_error(&anyhow::anyhow!("other")), exit_code::GENERAL_ERROR);
    }
}

//! Derive command - run the full pipeline and print the derived key.
//!
//! # Examples
//!
//! ```bash
//! # Hex salt, passphrase from the environment
//! SCRYPTGATE_PASSWORD=hunter2 scryptgate derive --salt 4e61436c --params '{"N":1024,"r":8,"p":16}'
//!
//! # Passphrase from a secret manager
//! echo "$SECRET" | scryptgate derive --password-stdin --salt-text NaCl
//! ```

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use scryptgate_core::{
    ErrorCategory, ErrorObject, KeyRequest, RustCryptoScrypt, ScryptParams, check_params,
    derive_key,
};

use crate::config::Config;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Parameter object as JSON (overrides [params] from the config file)
    #[arg(long, value_name = "JSON")]
    pub params: Option<String>,

    /// Salt as hex
    #[arg(
        long,
        value_name = "HEX",
        required_unless_present = "salt_text",
        conflicts_with = "salt_text"
    )]
    pub salt: Option<String>,

    /// Salt as UTF-8 text
    #[arg(long, value_name = "TEXT")]
    pub salt_text: Option<String>,

    /// Derived key length in bytes [default: from config, else 64]
    #[arg(short, long, value_name = "BYTES")]
    pub length: Option<usize>,

    /// Refuse parameters needing more working memory than this
    #[arg(long, value_name = "BYTES")]
    pub max_memory: Option<u64>,

    /// Passphrase (insecure, prefer --password-stdin or SCRYPTGATE_PASSWORD)
    #[arg(long, env = "SCRYPTGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read passphrase from stdin (single line)
    #[arg(long, conflicts_with = "password")]
    pub password_stdin: bool,
}

#[derive(Serialize)]
struct DeriveOutput {
    params: ScryptParams,
    key: String,
}

#[instrument(level = "info", name = "cmd::derive", skip_all)]
pub fn execute(args: &Args, config: &Config, json: bool) -> Result<()> {
    let value = config.resolve_params(args.params.as_deref())?;
    let salt = salt_bytes(args)?;
    let passphrase = get_passphrase(args)?;

    let mut backend = RustCryptoScrypt::new();
    if let Some(limit) = args.max_memory.or(config.derive.max_memory) {
        backend = backend.with_memory_limit(limit);
    }
    let request = KeyRequest::new(passphrase.as_bytes(), &salt)
        .with_key_length(args.length.unwrap_or(config.derive.key_length));

    let key = derive_key(&value, &request, &backend)?;
    tracing::info!(len = key.len(), "key derived");

    if json {
        print_json(&DeriveOutput {
            params: check_params(&value)?,
            key: key.to_hex(),
        })?;
    } else {
        println!("{}", key.to_hex());
    }
    Ok(())
}

fn salt_bytes(args: &Args) -> Result<Vec<u8>> {
    match (&args.salt, &args.salt_text) {
        (Some(hex_salt), _) => hex::decode(hex_salt).map_err(|e| {
            anyhow::Error::new(ErrorObject::argument(
                ErrorCategory::InternalArgument,
                format!("salt is not valid hex: {e}"),
            ))
        }),
        (None, Some(text)) => Ok(text.as_bytes().to_vec()),
        (None, None) => Ok(Vec::new()),
    }
}

fn get_passphrase(args: &Args) -> Result<String> {
    if args.password_stdin {
        read_password_from_stdin()
    } else if let Some(ref password) = args.password {
        Ok(password.clone())
    } else if io::stdin().is_terminal() {
        rpassword::prompt_password("Passphrase: ").context("failed to read passphrase")
    } else {
        anyhow::bail!("no passphrase given (use --password, --password-stdin or SCRYPTGATE_PASSWORD)")
    }
}

fn read_password_from_stdin() -> Result<String> {
    if io::stdin().is_terminal() {
        anyhow::bail!(
            "--password-stdin requires the passphrase to be piped in.\n\
             Example: echo \"$SECRET\" | scryptgate derive --password-stdin --salt-text NaCl"
        );
    }

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches('\n').trim_end_matches('\r');

    if password.is_empty() {
        anyhow::bail!("Passphrase from stdin is empty");
    }
    Ok(password.to_string())
}

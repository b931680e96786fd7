//! Validate command - check an N/r/p parameter object without deriving.
//!
//! # Examples
//!
//! ```bash
//! scryptgate validate --params '{"N": 16384, "r": 8, "p": 1}'
//!
//! # Machine-readable result (error objects are printed the same way)
//! scryptgate --json validate --params '{"N": "big"}'
//! ```

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use scryptgate_core::check_params;

use crate::config::Config;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Parameter object as JSON (overrides [params] from the config file)
    #[arg(long, value_name = "JSON")]
    pub params: Option<String>,
}

#[instrument(level = "info", name = "cmd::validate", skip_all)]
pub fn execute(args: &Args, config: &Config, json: bool) -> Result<()> {
    let value = config.resolve_params(args.params.as_deref())?;
    let params = check_params(&value)?;

    if json {
        print_json(&params)?;
    } else {
        println!("ok: {params}");
    }
    Ok(())
}

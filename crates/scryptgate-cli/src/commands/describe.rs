//! Describe command - look up native scrypt result codes.

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;

use scryptgate_core::native::{MAX_KNOWN_CODE, describe};

use crate::output::{create_table, print_json};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Result code to describe (omit to list every known code)
    #[arg(allow_negative_numbers = true)]
    pub code: Option<i32>,
}

#[derive(Serialize)]
struct CodeDescription {
    code: i32,
    description: &'static str,
}

impl CodeDescription {
    fn new(code: i32) -> Self {
        Self {
            code,
            description: describe(code),
        }
    }
}

pub fn execute(args: &Args, json: bool) -> Result<()> {
    if let Some(code) = args.code {
        let entry = CodeDescription::new(code);
        if json {
            print_json(&entry)?;
        } else {
            println!("{}", entry.description);
        }
        return Ok(());
    }

    let entries: Vec<_> = (0..=MAX_KNOWN_CODE).map(CodeDescription::new).collect();
    if json {
        print_json(&entries)?;
    } else {
        let mut table = create_table();
        table.set_header(vec!["Code", "Description"]);
        for entry in &entries {
            table.add_row(vec![entry.code.to_string(), entry.description.to_string()]);
        }
        println!("{table}");
    }
    Ok(())
}

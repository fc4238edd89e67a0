//! `fastfood inspect` command
//!
//! Prints the parsed declarations of a cookbook as JSON on stdout.

use anyhow::{Context, Result};

use crate::cli::InspectArgs;
use crate::commands::resolve_cookbook;
use crate::GlobalOptions;
use fastfood::core::cookbook::CookBook;

pub fn execute(args: InspectArgs, global: &GlobalOptions) -> Result<()> {
    let path = resolve_cookbook(Some(args.cookbook.as_path()), &global.settings);
    let cookbook = CookBook::open(&path)?;

    let manifest = if args.berksfile {
        cookbook.berksfile()?
    } else {
        cookbook.metadata()?
    };

    let json = serde_json::to_string_pretty(&manifest.to_json())
        .context("failed to serialize manifest")?;
    println!("{}", json);

    Ok(())
}

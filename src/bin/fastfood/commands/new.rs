//! `fastfood new` command

use anyhow::Result;
use serde_json::json;

use crate::cli::NewArgs;
use crate::commands::{open_pack, report_files};
use crate::GlobalOptions;
use fastfood::ops::fastfood_new::{new_cookbook, NewOptions};
use fastfood::util::Status;

pub fn execute(args: NewArgs, global: &GlobalOptions) -> Result<()> {
    let shell = global.shell;
    let pack = open_pack(&global.settings)?;

    let opts = NewOptions {
        name: args.name.clone(),
        force: args.force,
    };
    let result = new_cookbook(&pack, &global.settings.cookbook_path, &opts)?;

    report_files(shell, &result.cookbook, &result.files);
    shell.status(
        Status::Created,
        format!("cookbook `{}` at {}", args.name, result.cookbook.display()),
    );

    shell.json_event(&json!({
        "reason": "cookbook-created",
        "cookbook": result.cookbook,
        "files": result.files,
    }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_new_args(args: &[&str]) -> NewArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            new: NewArgs,
        }
        TestCli::parse_from(args).new
    }

    #[test]
    fn test_new_args_with_name_only() {
        let args = parse_new_args(&["test", "web"]);
        assert_eq!(args.name, "web");
        assert!(!args.force);
    }

    #[test]
    fn test_new_args_force() {
        assert!(parse_new_args(&["test", "web", "--force"]).force);
        assert!(parse_new_args(&["test", "-f", "web"]).force);
    }
}

//! `fastfood build` command

use anyhow::Result;
use serde_json::json;

use crate::cli::BuildArgs;
use crate::commands::{open_pack, report_files, report_updates};
use crate::GlobalOptions;
use fastfood::ops::fastfood_build::build_cookbook;
use fastfood::util::Status;

pub fn execute(args: BuildArgs, global: &GlobalOptions) -> Result<()> {
    let shell = global.shell;
    let pack = open_pack(&global.settings)?;

    let report = build_cookbook(
        &args.config_file,
        &pack,
        &global.settings.cookbook_path,
        args.force,
    )?;

    report_files(shell, &report.cookbook, &report.files);
    report_updates(shell, &report.cookbook, &report.manifest_updates);
    shell.status(
        Status::Info,
        format!(
            "built {} ({} file(s) written)",
            report.cookbook.display(),
            report.written_files().len()
        ),
    );

    shell.json_event(&json!({
        "reason": "build-finished",
        "report": report,
    }));

    Ok(())
}

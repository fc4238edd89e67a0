//! `fastfood gen` command

use anyhow::Result;
use serde_json::{json, Map, Value};

use crate::cli::GenArgs;
use crate::commands::{open_pack, report_files, report_updates, resolve_cookbook};
use crate::GlobalOptions;
use fastfood::ops::fastfood_build::{generate, StencilRequest};

/// Turn `key:value` pairs into stencil options. Later pairs win.
pub fn stencil_options(pairs: &[(String, String)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

pub fn execute(args: GenArgs, global: &GlobalOptions) -> Result<()> {
    let shell = global.shell;
    let pack = open_pack(&global.settings)?;
    let cookbook = resolve_cookbook(args.cookbook.as_deref(), &global.settings);

    let request = StencilRequest {
        stencil_set: args.stencil_set,
        stencil: args.stencil,
        options: stencil_options(&args.options),
    };
    let report = generate(&pack, &cookbook, &request, args.force)?;

    report_files(shell, &report.cookbook, &report.files);
    report_updates(shell, &report.cookbook, &report.manifest_updates);
    if report.written_files().is_empty()
        && report.manifest_updates.iter().all(|u| !u.changed)
    {
        shell.note(format!(
            "nothing to do for stencil set `{}`",
            request.stencil_set
        ));
    }

    shell.json_event(&json!({
        "reason": "stencil-applied",
        "stencil_set": request.stencil_set,
        "report": report,
    }));

    Ok(())
}

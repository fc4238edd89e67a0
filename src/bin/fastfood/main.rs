//! fastfood CLI - Chef cookbook generator

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use fastfood::core::pack::PackError;
use fastfood::engine::ManifestError;
use fastfood::util::diagnostic::Diagnostic;
use fastfood::util::{Config, Settings, Shell};

/// Options shared by every command.
pub struct GlobalOptions<'a> {
    pub shell: &'a Shell,
    pub settings: Settings,
}

impl<'a> GlobalOptions<'a> {
    /// Combine flags and environment with `~/.fastfood/config.toml`.
    fn resolve(
        shell: &'a Shell,
        template_pack: Option<PathBuf>,
        cookbook_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config = Config::load_global();
        let settings = Settings::resolve(template_pack, cookbook_path, &config)?;
        Ok(GlobalOptions { shell, settings })
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fastfood=debug")
    } else {
        EnvFilter::new("fastfood=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli, &shell) {
        report_error(&shell, &e);
        process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let Cli {
        template_pack,
        cookbook_path,
        command,
        ..
    } = cli;

    // Completions need no configuration.
    if let Commands::Completions(args) = command {
        return commands::completions::execute(args);
    }
    let global = GlobalOptions::resolve(shell, template_pack, cookbook_path)?;

    match command {
        Commands::New(args) => commands::new::execute(args, &global),
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Gen(args) => commands::gen::execute(args, &global),
        Commands::Inspect(args) => commands::inspect::execute(args, &global),
        Commands::Completions(_) => Ok(()),
    }
}

/// Print an error, as a diagnostic when the cause is one we know how to
/// explain.
fn report_error(shell: &Shell, e: &anyhow::Error) {
    if shell.is_json() {
        shell.error(format!("{:#}", e));
        return;
    }

    match diagnostic_for(e) {
        Some(diag) => eprint!("{}", diag.format(shell.use_color())),
        None => eprintln!("error: {:#}", e),
    }
}

fn diagnostic_for(e: &anyhow::Error) -> Option<Diagnostic> {
    for (depth, cause) in e.chain().enumerate() {
        let diag = if let Some(err) = cause.downcast_ref::<ManifestError>() {
            err.to_diagnostic()
        } else if let Some(err) = cause.downcast_ref::<PackError>() {
            err.to_diagnostic()
        } else {
            continue;
        };

        return Some(if depth > 0 {
            diag.with_context(e.to_string())
        } else {
            diag
        });
    }
    None
}

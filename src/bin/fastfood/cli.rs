//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use fastfood::util::shell::ColorChoice;

/// fastfood - Chef cookbook generator
#[derive(Parser)]
#[command(name = "fastfood")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for status messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Template pack location
    #[arg(long, global = true, env = "FASTFOOD_TEMPLATE_PACK", value_name = "DIR")]
    pub template_pack: Option<PathBuf>,

    /// Cookbooks directory
    #[arg(long, global = true, env = "FASTFOOD_COOKBOOK_PATH", value_name = "DIR")]
    pub cookbook_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new cookbook from the template pack's base files
    New(NewArgs),

    /// Build a cookbook from a fastfood.json file
    Build(BuildArgs),

    /// Apply a stencil set to an existing cookbook
    Gen(GenArgs),

    /// Show the parsed metadata.rb or Berksfile of a cookbook
    Inspect(InspectArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Cookbook name
    pub name: String,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build file
    #[arg(default_value = "fastfood.json")]
    pub config_file: PathBuf,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct GenArgs {
    /// Stencil set to apply
    pub stencil_set: String,

    /// Stencil options as key:value
    #[arg(value_name = "OPTION", value_parser = parse_option)]
    pub options: Vec<(String, String)>,

    /// Stencil within the set (defaults to the set's default stencil)
    #[arg(long)]
    pub stencil: Option<String>,

    /// Cookbook name or directory (defaults to the current directory)
    #[arg(long)]
    pub cookbook: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Cookbook name or directory
    pub cookbook: PathBuf,

    /// Show the Berksfile instead of metadata.rb
    #[arg(long)]
    pub berksfile: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Parse a `key:value` stencil option.
pub fn parse_option(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("bad option `{}`; expected key:value", s)),
    }
}

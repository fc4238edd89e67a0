//! Error reports for the terminal.
//!
//! ```text
//! error: unknown attribute `github` on cookbook `cron`
//!   --> cookbooks/web/Berksfile
//!   = cookbooks/web/Berksfile:4: `cookbook 'cron', github: 'x/cron'`
//! help: Use one of: branch, git, path, ref, revision, tag
//! ```

use std::fmt;
use std::path::PathBuf;

/// Hints shared by more than one error.
pub mod suggestions {
    pub const NO_COOKBOOK: &str = "Run `fastfood new <name>` to create the cookbook";

    pub const NO_TEMPLATE_PACK: &str =
        "Pass `--template-pack <dir>` or set FASTFOOD_TEMPLATE_PACK";

    pub const STENCIL_SET_NOT_LISTED: &str =
        "Add the stencil set under `stencil_sets` in the template pack manifest.json";
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    /// Extra lines, usually the offending declaration.
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    /// File the error is about.
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for stderr, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("\x1b[1;{}m{}\x1b[0m", code, text)
            } else {
                text.to_string()
            }
        };

        let mut output = format!("{}: {}\n", paint("31", "error"), self.message);
        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }
        for line in &self.context {
            output.push_str(&format!("  = {}\n", line));
        }
        for suggestion in &self.suggestions {
            output.push_str(&format!("{}: {}\n", paint("32", "help"), suggestion));
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

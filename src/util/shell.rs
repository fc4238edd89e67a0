//! Status output for the `fastfood` binary.
//!
//! Human mode prints right-aligned status lines to stderr. JSON mode prints
//! one event object per line to stdout and nothing else.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    #[default]
    Normal,
    /// Also list inserted statements and already-declared dependencies.
    Verbose,
}

/// Value of `--color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!("invalid color choice '{}'; expected auto, always or never", s)),
        }
    }
}

/// Leading word of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Created,
    Writing,
    Appended,
    Updated,
    Fresh,
    Info,
    Skipped,
    Error,
}

impl Status {
    fn label(self) -> (&'static str, &'static str) {
        match self {
            Status::Created => ("Created", "32"),
            Status::Writing => ("Writing", "32"),
            Status::Appended => ("Appended", "32"),
            Status::Updated => ("Updated", "32"),
            Status::Fresh => ("Fresh", "34"),
            Status::Info => ("Info", "34"),
            Status::Skipped => ("Skipped", "33"),
            Status::Error => ("error", "31"),
        }
    }
}

const STATUS_WIDTH: usize = 12;

#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    json: bool,
    use_color: bool,
}

impl Shell {
    /// JSON output wins over `--quiet` and `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let use_color = !json
            && match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            };

        Shell {
            verbosity: if json { Verbosity::Normal } else { verbosity },
            json,
            use_color,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    fn shows(&self, status: Status) -> bool {
        !self.json && (self.verbosity != Verbosity::Quiet || status == Status::Error)
    }

    pub fn status(&self, status: Status, msg: impl Display) {
        if self.shows(status) {
            eprintln!("{} {}", self.format_status(status), msg);
        }
    }

    pub fn verbose_status(&self, status: Status, msg: impl Display) {
        if self.is_verbose() {
            self.status(status, msg);
        }
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// In JSON mode the error becomes a `{"reason": "error"}` event.
    pub fn error(&self, msg: impl Display) {
        if self.json {
            self.json_event(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string(),
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Print one event line on stdout. Ignored in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.json {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", event);
        let _ = stdout.flush();
    }

    fn format_status(&self, status: Status) -> String {
        let (text, color) = status.label();
        if self.use_color {
            format!("\x1b[1;{}m{:>width$}\x1b[0m", color, text, width = STATUS_WIDTH)
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}

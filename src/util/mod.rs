//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod shell;

pub use config::{Config, Settings};
pub use diagnostic::Diagnostic;
pub use shell::{Shell, Status};

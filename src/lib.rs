//! fastfood - Chef cookbook generator
//!
//! This crate provides the library behind the `fastfood` command: parsing
//! and merging `metadata.rb` and `Berksfile` declarations, template packs,
//! and the operations that render stencils into cookbooks.

pub mod core;
pub mod engine;
pub mod ops;
pub mod templating;
pub mod util;

/// Test utilities for fastfood unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides declaration file fixtures and a small
/// template pack.
#[cfg(test)]
pub mod test_support;

pub use core::{
    cookbook::CookBook,
    dialect::{Dialect, BERKSFILE, METADATA},
    manifest::Manifest,
    pack::TemplatePack,
};
pub use engine::ManifestError;

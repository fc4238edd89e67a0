//! Core data structures for fastfood.
//!
//! This module contains the foundational types used throughout fastfood:
//! - Declaration dialects (`metadata.rb`, `Berksfile`)
//! - The parsed manifest model
//! - Cookbook directories
//! - Template packs and stencil sets

pub mod cookbook;
pub mod dialect;
pub mod manifest;
pub mod pack;

pub use cookbook::CookBook;
pub use dialect::{Dialect, BERKSFILE, METADATA};
pub use manifest::{Attributes, Manifest};
pub use pack::{PackError, Stencil, StencilSet, TemplatePack};

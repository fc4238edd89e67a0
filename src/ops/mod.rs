//! High-level operations.
//!
//! This module contains the implementation of fastfood commands.

pub mod fastfood_build;
pub mod fastfood_new;
pub mod manifest_update;
pub mod render;

pub use fastfood_build::{
    apply_stencil, build_cookbook, generate, BuildConfig, BuildReport, StencilRequest,
};
pub use fastfood_new::{new_cookbook, NewOptions, NewResult};
pub use manifest_update::{load_manifest, read_declarations, update_manifest, UpdateReport};
pub use render::{FileAction, FileEvent, RunLog};

//! Test utilities for fastfood unit tests.
//!
//! Fixtures live in [`fixtures`]; everything here is compiled only for
//! `cargo test`.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{PackFixture, write_cookbook, METADATA_RB};
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let pack = PackFixture::write(tmp.path());
//! let cookbook = write_cookbook(tmp.path(), "web", METADATA_RB, None);
//! ```

pub mod fixtures;

pub use fixtures::*;

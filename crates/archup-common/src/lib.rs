//! Archup Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the archup workspace.
//!
//! - **Error Handling**: [`ArchupError`] and the [`Result`] alias
//! - **Types**: archive versions and version-bump policies
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```
//! use archup_common::types::{BumpPolicy, Version};
//!
//! let next = Version::new(1, 4, 2).bump(BumpPolicy::Minor);
//! assert_eq!(next.to_string(), "1.5.0");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{ArchupError, Result};

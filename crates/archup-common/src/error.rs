//! Error types shared across archup crates

use thiserror::Error;

/// Result type alias for shared archup operations
pub type Result<T> = std::result::Result<T, ArchupError>;

/// Parse failures for the shared version types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchupError {
    #[error("Invalid version format '{0}': expected major.minor.patch")]
    InvalidVersion(String),

    #[error("Invalid bump policy '{0}': expected one of major, minor, patch")]
    InvalidBumpPolicy(String),
}

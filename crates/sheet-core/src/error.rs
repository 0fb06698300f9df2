#![forbid(unsafe_code)]

//! Engine construction errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetError>;

/// Structural misconfiguration, reported when the engine is built.
///
/// Runtime inputs (samples, sizes, offsets) are normalized rather than
/// rejected, so these are the only errors the engine produces.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    #[error("no snap sizes configured; at least one sheet size is required")]
    NoSnapSizes,

    #[error("invalid sheet configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}

#![forbid(unsafe_code)]

//! Logging shims.
//!
//! With the `tracing` feature enabled the macros below are re-exports of the
//! `tracing` crate. Without it they expand to nothing, so call sites never
//! need their own `cfg` guards.
//!
//! ```ignore
//! #[cfg(feature = "tracing")]
//! use crate::logging::debug;
//! #[cfg(not(feature = "tracing"))]
//! use crate::debug;
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

/// No-op `debug!` used when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// No-op `trace!` used when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// No-op `warn!` used when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

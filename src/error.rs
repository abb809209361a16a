//! Crate-wide error type: configuration, input, and invariant-violation failures.

use thiserror::Error;

/// Everything that can go fatally wrong while building or running a simulation.
///
/// There are no retriable errors: any variant here propagates straight to
/// the process boundary.
#[derive(Error, Debug)]
pub enum SimError {
    /// A configuration-time parameter relation was violated (e.g. `B > C`).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Trace input was missing, unreadable, or malformed.
    #[error("input error: {0}")]
    Input(String),

    /// A runtime invariant was violated (e.g. sub-block index out of range).
    /// Unreachable by construction; surfaced rather than silently tolerated.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

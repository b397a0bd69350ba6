//! Errors raised by the stamperr library itself.
//!
//! These are failures of the *machinery* (building a node, decoding a payload,
//! installing the observer), never the stamped errors callers construct.

use thiserror::Error;

/// Errors that can occur while building, decoding or observing stamped errors.
#[derive(Debug, Error)]
pub enum StampError {
    /// The kind tag would be ambiguous in the canonical text form.
    #[error("invalid kind {kind:?}: {reason}")]
    InvalidKind { kind: String, reason: &'static str },

    /// NaN and infinities have no canonical decimal form.
    #[error("non-finite float in payload: {value}")]
    NonFiniteFloat { value: f64 },

    /// Encoded payload text does not have the requested shape.
    #[error("cannot decode {raw:?} as {expected}")]
    Decode {
        expected: &'static str,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// `observer::install` was called more than once.
    #[error("an observer is already installed")]
    ObserverInstalled,

    /// The observer drain thread could not be started.
    #[error("failed to spawn observer thread: {0}")]
    ObserverSpawn(#[from] std::io::Error),
}

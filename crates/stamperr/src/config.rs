//! Observer configuration.

use serde::{Deserialize, Serialize};

/// Settings for [`crate::observer::install`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Events buffered for the drain thread before new ones are dropped
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Name given to the drain thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_capacity() -> usize { 1_024 }
fn default_thread_name() -> String { "stamperr-observer".to_string() }

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            thread_name: default_thread_name(),
        }
    }
}

impl ObserverConfig {
    /// Default config with a different queue bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

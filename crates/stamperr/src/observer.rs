//! Process-wide observer of newly constructed errors.
//!
//! Constructors never block and never fail because of the observer: each new
//! node is offered to a bounded queue with `try_send`, and a dedicated thread
//! feeds the queue to the callback. A full queue drops the event and counts it.
//!
//! ```rust,no_run
//! use stamperr::{config::ObserverConfig, observer, StampedError};
//!
//! observer::install(&ObserverConfig::default(), |err: &StampedError| {
//!     eprintln!("error created: {err}");
//! })?;
//! let _ = StampedError::new(1, "boom");
//! # Ok::<(), stamperr::StampError>(())
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::config::ObserverConfig;
use crate::error::StampError;
use crate::node::StampedError;

struct Hook {
    sender: Sender<StampedError>,
}

static HOOK: OnceLock<Hook> = OnceLock::new();
static DELIVERED: AtomicU64 = AtomicU64::new(0);
static DROPPED: AtomicU64 = AtomicU64::new(0);
static PANICKED: AtomicU64 = AtomicU64::new(0);

/// Observer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverStats {
    /// Events the callback has returned from
    pub delivered: u64,
    /// Events rejected because the queue was full or gone
    pub dropped: u64,
    /// Events whose callback panicked
    pub panicked: u64,
}

/// Install `callback` as the observer. Only the first call succeeds.
pub fn install<F>(config: &ObserverConfig, callback: F) -> Result<(), StampError>
where
    F: Fn(&StampedError) + Send + 'static,
{
    if HOOK.get().is_some() {
        return Err(StampError::ObserverInstalled);
    }
    let (sender, receiver) = bounded(config.capacity.max(1));
    thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || drain(receiver, callback))?;
    // a losing racer drops its sender here, which ends its drain thread
    HOOK.set(Hook { sender })
        .map_err(|_| StampError::ObserverInstalled)?;
    debug!(capacity = config.capacity, thread = %config.thread_name, "observer installed");
    Ok(())
}

/// `true` once an observer has been installed.
pub fn is_installed() -> bool {
    HOOK.get().is_some()
}

pub fn stats() -> ObserverStats {
    ObserverStats {
        delivered: DELIVERED.load(Ordering::Relaxed),
        dropped: DROPPED.load(Ordering::Relaxed),
        panicked: PANICKED.load(Ordering::Relaxed),
    }
}

/// Offer a freshly built node to the observer, if any.
pub(crate) fn notify(node: &StampedError) {
    let Some(hook) = HOOK.get() else {
        return;
    };
    match hook.sender.try_send(node.clone()) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
            let dropped = DROPPED.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(dropped, "observer queue rejected event");
        }
    }
}

fn drain<F>(receiver: Receiver<StampedError>, callback: F)
where
    F: Fn(&StampedError),
{
    for node in receiver.iter() {
        match panic::catch_unwind(AssertUnwindSafe(|| callback(&node))) {
            Ok(()) => {
                DELIVERED.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                PANICKED.fetch_add(1, Ordering::Relaxed);
                warn!(error = %node, "observer callback panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_without_hook_is_a_no_op() {
        // unit tests never install, so nothing is queued or dropped
        let _ = StampedError::new(1, "x");
        assert!(!is_installed());
        assert_eq!(stats().dropped, 0);
    }
}

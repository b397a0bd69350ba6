//! Structural comparison and lookups across an error chain.
//!
//! Everything here walks the chain through [`Error::source`], so a foreign
//! wrapper that exposes a `StampedError` as its source is traversed too.

use std::error::Error;
use std::iter;

use crate::node::StampedError;
use crate::payload::DataType;
use crate::render::Block;

type DynError = dyn Error + 'static;

/// Every error in the chain, outermost first.
fn chain(err: &DynError) -> impl Iterator<Item = &DynError> {
    iter::successors(Some(err), |&e| e.source())
}

/// Every stamped node in the chain, outermost first.
fn nodes(err: &DynError) -> impl Iterator<Item = &StampedError> {
    chain(err).filter_map(|e| e.downcast_ref::<StampedError>())
}

/// Skip wrappers that leave no trace in the rendered text (zero stamp, no
/// kind, no message). Parsing cannot recover them, so they must not count.
fn skip_invisible(mut err: Option<&DynError>) -> Option<&DynError> {
    while let Some(e) = err {
        match e.downcast_ref::<StampedError>() {
            Some(node)
                if node.is_wrapper() && node.message.is_empty() && !Block(node).is_visible() =>
            {
                err = e.source();
            }
            _ => break,
        }
    }
    err
}

/// Compare two chains position by position, ignoring stamps.
///
/// Stamped nodes are compared on kind, encoded data and message. When the two
/// sides stop agreeing node by node and either side is plain text (a foreign
/// error, or a node without a visible block), the rest of each chain is
/// compared on its rendered text. `None` only matches `None`.
pub fn is_match(a: Option<&DynError>, b: Option<&DynError>) -> bool {
    let (mut a, mut b) = (a, b);
    loop {
        a = skip_invisible(a);
        b = skip_invisible(b);
        let (x, y) = match (a, b) {
            (None, None) => return true,
            (Some(x), Some(y)) => (x, y),
            _ => return false,
        };
        match (
            x.downcast_ref::<StampedError>(),
            y.downcast_ref::<StampedError>(),
        ) {
            (Some(n), Some(m)) if same_node(n, m) => {}
            // both bracketed: a real difference
            (Some(n), Some(m)) if Block(n).is_visible() && Block(m).is_visible() => return false,
            _ => return x.to_string() == y.to_string(),
        }
        a = x.source();
        b = y.source();
    }
}

fn same_node(a: &StampedError, b: &StampedError) -> bool {
    let data = |n: &StampedError| n.data.as_ref().map(|d| d.encoded().into_owned());
    a.kind == b.kind && a.message == b.message && data(a) == data(b)
}

/// The first payload under `kind` that decodes as `T`, outermost first.
///
/// A node whose data has a different shape is a miss and the walk goes on.
///
/// ```rust
/// let err = stamperr::StampedError::new_data(1, "boom", "failure", 10)?;
/// let err = stamperr::StampedError::wrap(2, err);
/// assert_eq!(stamperr::find_data::<i64>(&err, "failure"), Some(10));
/// assert_eq!(stamperr::find_data::<String>(&err, "failure"), None);
/// # Ok::<(), stamperr::StampError>(())
/// ```
pub fn find_data<T: DataType>(err: &DynError, kind: &str) -> Option<T> {
    nodes(err)
        .filter(|n| n.kind() == kind)
        .find_map(|n| n.data_as::<T>())
}

/// `true` when a node in the chain carries `kind` with data that decodes as `T`.
pub fn is_data_kind<T: DataType>(err: &DynError, kind: &str) -> bool {
    nodes(err).any(|n| n.kind() == kind && n.data_as::<T>().is_some())
}

/// `true` when any node in the chain carries `kind`.
pub fn is_kind(err: &DynError, kind: &str) -> bool {
    !kind.is_empty() && nodes(err).any(|n| n.kind() == kind)
}

/// The innermost error of the chain.
pub fn cause(err: &DynError) -> &DynError {
    chain(err).last().unwrap_or(err)
}

/// Stamps of the chain, outermost first. Unstamped wrappers are skipped.
pub fn trace(err: &DynError) -> Vec<i64> {
    nodes(err).filter_map(StampedError::stamp).collect()
}

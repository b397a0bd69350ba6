//! Canonical rendering of a node chain.
//!
//! ```text
//! [ts 3]; generic: [ts 2 kind notfound]; [ts 1 kind failure data 10] base
//! ```

use std::fmt;

use crate::node::{Source, StampedError};

/// The bracketed header of a node, e.g. `[ts 1 kind failure data 10]`.
pub(crate) struct Block<'a>(pub(crate) &'a StampedError);

impl Block<'_> {
    /// A zero or absent stamp with no kind renders nothing at all.
    pub(crate) fn is_visible(&self) -> bool {
        self.0.kind.is_some() || self.0.stamp.is_some_and(|s| s != 0)
    }
}

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        write!(f, "[ts {}", node.stamp.unwrap_or(0))?;
        if let Some(kind) = &node.kind {
            write!(f, " kind {kind}")?;
            if let Some(data) = &node.data {
                write!(f, " data {}", data.encoded())?;
            }
        }
        f.write_str("]")
    }
}

impl fmt::Display for StampedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block = Block(self);
        match &self.source {
            Source::None => match (block.is_visible(), self.message.is_empty()) {
                (false, _) => f.write_str(&self.message),
                (true, true) => write!(f, "{block}"),
                (true, false) => write!(f, "{block} {}", self.message),
            },
            Source::Node(inner) => write_wrapper(f, &block, &self.message, inner),
            Source::Foreign(inner) => write_wrapper(f, &block, &self.message, inner),
        }
    }
}

fn write_wrapper(
    f: &mut fmt::Formatter<'_>,
    block: &Block<'_>,
    message: &str,
    inner: &dyn fmt::Display,
) -> fmt::Result {
    if block.is_visible() {
        write!(f, "{block}; {inner}")
    } else if !message.is_empty() {
        write!(f, "{message} {inner}")
    } else {
        write!(f, "{inner}")
    }
}

//! `StampedError`: one link of a stamped error chain.

use std::error::Error;
use std::sync::Arc;

use crate::error::StampError;
use crate::observer;
use crate::payload::{DataSlot, DataType, Payload};

/// What a node wraps.
#[derive(Debug, Clone)]
pub(crate) enum Source {
    /// Terminal node.
    None,
    /// Another stamped node, owned by this one.
    Node(Box<StampedError>),
    /// Any other error; only its text takes part in rendering.
    Foreign(Arc<dyn Error + Send + Sync + 'static>),
}

impl Source {
    fn from_error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(err))
    }

    fn from_boxed(err: Box<dyn Error + Send + Sync + 'static>) -> Self {
        match err.downcast::<StampedError>() {
            Ok(node) => Self::Node(node),
            Err(other) => Self::Foreign(Arc::from(other)),
        }
    }
}

/// A stamped error node.
///
/// Built with [`StampedError::new`] (terminal) or [`StampedError::wrap`]
/// (around any other error), optionally tagged with a kind and a typed
/// payload. `Display` produces the canonical text form and
/// [`crate::parse`] turns that text back into an equivalent chain.
///
/// ```rust
/// use stamperr::{find_data, parse, StampedError};
///
/// let err = StampedError::new_data(1713705663160, "something went wrong", "failure", 10)?;
/// let err = StampedError::wrap(1713705663161, err);
/// assert_eq!(err.to_string(), "[ts 1713705663161]; [ts 1713705663160 kind failure data 10] something went wrong");
///
/// let parsed = parse(&err.to_string());
/// assert_eq!(find_data::<i64>(&parsed, "failure"), Some(10));
/// # Ok::<(), stamperr::StampError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StampedError {
    pub(crate) stamp: Option<i64>,
    pub(crate) kind: Option<String>,
    pub(crate) data: Option<DataSlot>,
    pub(crate) message: String,
    pub(crate) source: Source,
}

impl StampedError {
    // ─── Constructors ─────────────────────────────────────────────────────────

    /// A terminal node carrying `message`.
    pub fn new(stamp: i64, message: impl Into<String>) -> Self {
        Self::terminal(Some(stamp), message.into()).published()
    }

    /// A node wrapping `cause`. A `StampedError` cause is kept as structure,
    /// anything else is kept as opaque text.
    pub fn wrap<E>(stamp: i64, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::wrapping(Some(stamp), Source::from_error(cause)).published()
    }

    /// Like [`StampedError::wrap`], for an already boxed error.
    pub fn wrap_boxed(stamp: i64, cause: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self::wrapping(Some(stamp), Source::from_boxed(cause)).published()
    }

    /// A terminal node tagged with `kind`.
    pub fn new_kind(
        stamp: i64,
        message: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<Self, StampError> {
        Ok(Self::terminal(Some(stamp), message.into())
            .with_kind(kind)?
            .published())
    }

    /// A wrapping node tagged with `kind`.
    pub fn wrap_kind<E>(stamp: i64, cause: E, kind: impl Into<String>) -> Result<Self, StampError>
    where
        E: Error + Send + Sync + 'static,
    {
        Ok(Self::wrapping(Some(stamp), Source::from_error(cause))
            .with_kind(kind)?
            .published())
    }

    /// A terminal node carrying `value` under `kind`.
    pub fn new_data(
        stamp: i64,
        message: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<Payload>,
    ) -> Result<Self, StampError> {
        Ok(Self::terminal(Some(stamp), message.into())
            .with_data(kind, value)?
            .published())
    }

    /// A wrapping node carrying `value` under `kind`.
    pub fn wrap_data<E>(
        stamp: i64,
        cause: E,
        kind: impl Into<String>,
        value: impl Into<Payload>,
    ) -> Result<Self, StampError>
    where
        E: Error + Send + Sync + 'static,
    {
        Ok(Self::wrapping(Some(stamp), Source::from_error(cause))
            .with_data(kind, value)?
            .published())
    }

    /// An unstamped wrapper that prefixes `message` to the rendering of
    /// `cause`, e.g. `"loading config: [ts 7] file missing"`.
    pub fn context<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let mut node = Self::wrapping(None, Source::from_error(cause));
        node.message = message.into();
        node.published()
    }

    // ─── Builder steps ────────────────────────────────────────────────────────

    /// Tag the node with `kind`. An empty kind clears both kind and data.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Result<Self, StampError> {
        let kind = kind.into();
        if kind.is_empty() {
            self.kind = None;
            self.data = None;
            return Ok(self);
        }
        validate_kind(&kind)?;
        self.kind = Some(kind);
        Ok(self)
    }

    /// Attach `value` under `kind`.
    pub fn with_data(
        self,
        kind: impl Into<String>,
        value: impl Into<Payload>,
    ) -> Result<Self, StampError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(StampError::InvalidKind {
                kind,
                reason: "data requires a kind",
            });
        }
        let value = value.into();
        value.validate()?;
        let mut node = self.with_kind(kind)?;
        node.data = Some(DataSlot::Value(value));
        Ok(node)
    }

    // ─── Accessors ────────────────────────────────────────────────────────────

    /// The creation stamp, absent on plain message wrappers.
    pub fn stamp(&self) -> Option<i64> {
        self.stamp
    }

    /// The kind tag; empty when absent.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    pub fn data(&self) -> Option<&DataSlot> {
        self.data.as_ref()
    }

    /// This node's data as `T`, if present and decodable.
    pub fn data_as<T: DataType>(&self) -> Option<T> {
        self.data.as_ref().and_then(|d| d.get::<T>().ok())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped node, when the cause is itself a `StampedError`.
    pub fn unwrap_node(&self) -> Option<&StampedError> {
        match &self.source {
            Source::Node(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// `true` when the node wraps another error.
    pub fn is_wrapper(&self) -> bool {
        !matches!(self.source, Source::None)
    }

    /// Structural comparison ignoring stamps; see [`crate::is_match`].
    pub fn matches(&self, other: &(dyn Error + 'static)) -> bool {
        crate::matcher::is_match(Some(self as &(dyn Error + 'static)), Some(other))
    }

    // ─── Crate-internal construction (no observer notification) ───────────────

    pub(crate) fn terminal(stamp: Option<i64>, message: String) -> Self {
        Self {
            stamp,
            kind: None,
            data: None,
            message,
            source: Source::None,
        }
    }

    pub(crate) fn wrapping(stamp: Option<i64>, source: Source) -> Self {
        Self {
            stamp,
            kind: None,
            data: None,
            message: String::new(),
            source,
        }
    }

    /// Wrap an already built node.
    pub(crate) fn around(stamp: Option<i64>, inner: StampedError) -> Self {
        Self::wrapping(stamp, Source::Node(Box::new(inner)))
    }

    /// Attach kind and raw data recovered from text. Empty strings mean absent.
    pub(crate) fn with_recovered(mut self, kind: String, data: String) -> Self {
        if !kind.is_empty() {
            self.kind = Some(kind);
            if !data.is_empty() {
                self.data = Some(DataSlot::Encoded(data));
            }
        }
        self
    }

    fn published(self) -> Self {
        observer::notify(&self);
        self
    }
}

impl Error for StampedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Source::None => None,
            Source::Node(inner) => Some(inner.as_ref()),
            Source::Foreign(inner) => Some(inner.as_ref()),
        }
    }
}

fn validate_kind(kind: &str) -> Result<(), StampError> {
    let reason = if kind.contains('[') {
        "contains '['"
    } else if kind.contains(']') {
        "contains ']'"
    } else if kind.contains(" data ") {
        "contains ' data '"
    } else if kind.ends_with(" data") {
        "ends with ' data'"
    } else {
        return Ok(());
    };
    Err(StampError::InvalidKind {
        kind: kind.to_string(),
        reason,
    })
}

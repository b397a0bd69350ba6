//! stamperr: stamped, chainable errors with a reversible text form.
//!
//! This crate defines:
//! - [`StampedError`]: one node of an error chain: stamp, kind, typed data, message
//! - [`Payload`] / [`DataType`]: the closed set of data shapes and their encoding
//! - [`parse`] / [`frames`]: canonical text back into a chain
//! - [`is_match`], [`find_data`], [`is_kind`], [`is_data_kind`], [`cause`], [`trace`]: chain queries
//! - [`Report`] / [`render_report`]: human-facing summaries
//! - [`observer`]: optional process-wide hook on error construction

pub mod config;
pub mod error;
pub mod frame;
pub mod lexer;
pub mod matcher;
pub mod node;
pub mod observer;
pub mod payload;
mod render;
pub mod report;

pub use config::ObserverConfig;
pub use error::StampError;
pub use frame::{frames, parse, Frame};
pub use matcher::{cause, find_data, is_data_kind, is_kind, is_match, trace};
pub use node::StampedError;
pub use payload::{DataSlot, DataType, Payload};
pub use report::{render_report, Report, ReportMode};

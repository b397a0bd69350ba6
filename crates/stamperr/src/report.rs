//! Human-facing summaries of a chain.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::frame::frames;
use crate::matcher;
use crate::node::StampedError;

/// Condensed view of a chain: what went wrong, where, and of which kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Message of the innermost error.
    pub message: String,
    /// Stamps, outermost first.
    pub traces: Vec<i64>,
    /// The outermost kind in the chain, if any.
    pub kind: Option<String>,
}

impl Report {
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let root = matcher::cause(err);
        let message = match root.downcast_ref::<StampedError>() {
            Some(node) => node.message().to_string(),
            None => root.to_string(),
        };
        let kind = std::iter::successors(Some(err), |&e| e.source())
            .filter_map(|e| e.downcast_ref::<StampedError>())
            .map(StampedError::kind)
            .find(|k| !k.is_empty())
            .map(str::to_string);
        Self {
            message,
            traces: matcher::trace(err),
            kind,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Layouts for [`render_report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportMode {
    /// The canonical string.
    #[default]
    Default,
    /// Frames innermost first, joined by `; `.
    Reversed,
    /// One frame per line, indented two spaces per level.
    Indent,
    /// Innermost first, one per line, indented.
    ReversedIndent,
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "reversed" => Ok(Self::Reversed),
            "indent" => Ok(Self::Indent),
            "reversed-indent" => Ok(Self::ReversedIndent),
            other => Err(format!("unknown report mode: {other}")),
        }
    }
}

/// Lay out `err` frame by frame. Frames with no text are skipped.
pub fn render_report(err: &dyn Error, mode: ReportMode) -> String {
    let text = err.to_string();
    if mode == ReportMode::Default {
        return text;
    }
    let mut parts: Vec<String> = frames(&text)
        .iter()
        .map(|f| f.to_string().trim().to_string())
        .collect();
    if matches!(mode, ReportMode::Reversed | ReportMode::ReversedIndent) {
        parts.reverse();
    }
    match mode {
        ReportMode::Reversed => parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => parts
            .into_iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty())
            .map(|(depth, p)| format!("{:width$}{p}", "", width = depth * 2))
            .collect::<Vec<_>>()
            .join(";\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn chain() -> StampedError {
        let err = StampedError::new_data(1, "base", "failure", 10).unwrap();
        let err = StampedError::context("loading:", err);
        let err = StampedError::wrap_kind(2, err, "io").unwrap();
        StampedError::wrap(3, err)
    }

    #[test]
    fn report_summary() {
        let r = Report::from_error(&chain());
        assert_eq!(r.message, "base");
        assert_eq!(r.traces, vec![3, 2, 1]);
        assert_eq!(r.kind.as_deref(), Some("io"));
    }

    #[test]
    fn report_of_foreign_root() {
        let err = StampedError::wrap(4, io::Error::new(io::ErrorKind::Other, "disk full"));
        let r = Report::from_error(&err);
        assert_eq!(r.message, "disk full");
        assert_eq!(r.traces, vec![4]);
        assert_eq!(r.kind, None);
    }

    #[test]
    fn report_serializes() {
        let r = Report::from_error(&chain());
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"message":"base","traces":[3,2,1],"kind":"io"}"#);
    }

    #[test]
    fn default_mode_is_canonical() {
        let err = chain();
        assert_eq!(render_report(&err, ReportMode::Default), err.to_string());
    }

    #[test]
    fn reversed_mode() {
        assert_eq!(
            render_report(&chain(), ReportMode::Reversed),
            "[ts 1 kind failure data 10] base; loading:; [ts 2 kind io]; [ts 3]"
        );
    }

    #[test]
    fn indent_modes() {
        assert_eq!(
            render_report(&chain(), ReportMode::Indent),
            "[ts 3];\n  [ts 2 kind io];\n    loading:;\n      [ts 1 kind failure data 10] base"
        );
        assert_eq!(
            render_report(&chain(), ReportMode::ReversedIndent),
            "[ts 1 kind failure data 10] base;\n  loading:;\n    [ts 2 kind io];\n      [ts 3]"
        );
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("reversed-indent".parse::<ReportMode>(), Ok(ReportMode::ReversedIndent));
        assert!("sideways".parse::<ReportMode>().is_err());
    }
}

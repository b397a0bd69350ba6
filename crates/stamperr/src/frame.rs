//! Frame assembly: token stream → frames → node chain.
//!
//! Parsing never fails and never rewrites text. A bracket group that would not
//! render back to the same bytes (non-integer or non-canonical stamp, data
//! without a kind, a zero stamp with no kind), a frame still open at end of
//! input, and a frame glued to its neighbouring text are all kept as plain
//! message text, so rendering a parsed chain reproduces the input exactly.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::StampedError;

// ─── Frame ────────────────────────────────────────────────────────────────────

/// One unit recovered from the text, before reduction to nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// `None` for free-text frames.
    pub stamp: Option<i64>,
    /// Raw kind text, empty when absent.
    pub kind: String,
    /// Raw encoded data text, empty when absent.
    pub data: String,
    pub message: String,
    /// `false` only for the last frame.
    pub is_wrapper: bool,
}

impl Frame {
    fn unstamped(message: String, is_wrapper: bool) -> Self {
        Self {
            stamp: None,
            kind: String::new(),
            data: String::new(),
            message,
            is_wrapper,
        }
    }

    pub fn is_stamped(&self) -> bool {
        self.stamp.is_some()
    }
}

/// The frame on its own, without what it wraps.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(stamp) = self.stamp else {
            return f.write_str(&self.message);
        };
        write!(f, "[ts {stamp}")?;
        if !self.kind.is_empty() {
            write!(f, " kind {}", self.kind)?;
            if !self.data.is_empty() {
                write!(f, " data {}", self.data)?;
            }
        }
        f.write_str("]")?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

// ─── Assembler ────────────────────────────────────────────────────────────────

/// A bracketed frame still being read.
struct OpenFrame {
    raw: String,
    stamp: String,
    kind: String,
    data: String,
    field: TokenKind,
}

impl OpenFrame {
    fn new(opener: &str) -> Self {
        Self {
            raw: opener.to_string(),
            stamp: String::new(),
            kind: String::new(),
            data: String::new(),
            field: TokenKind::Stamp,
        }
    }

    fn push(&mut self, tok: &Token<'_>) {
        self.raw.push_str(tok.text);
        match tok.kind {
            TokenKind::Stamp | TokenKind::Kind | TokenKind::Data => self.field = tok.kind,
            _ => match self.field {
                TokenKind::Kind => self.kind.push_str(tok.text),
                TokenKind::Data => self.data.push_str(tok.text),
                _ => self.stamp.push_str(tok.text),
            },
        }
    }

    /// Close the frame. `Err` hands back the raw text unless the frame
    /// renders back to exactly those bytes and is visible once rendered.
    fn close(mut self, closer: &str) -> Result<(Frame, String), String> {
        self.raw.push_str(closer);
        let Ok(stamp) = self.stamp.parse::<i64>() else {
            return Err(self.raw);
        };
        if stamp == 0 && self.kind.is_empty() {
            return Err(self.raw);
        }
        let frame = Frame {
            stamp: Some(stamp),
            kind: self.kind,
            data: self.data,
            message: String::new(),
            is_wrapper: false,
        };
        if frame.to_string() != self.raw {
            return Err(self.raw);
        }
        Ok((frame, self.raw))
    }
}

#[derive(Default)]
struct Assembler {
    frames: Vec<Frame>,
    /// Text not yet assigned to a frame.
    message: String,
    open: Option<OpenFrame>,
    /// A closed frame and its raw text, waiting to learn whether it wraps
    /// (`; `) or ends the chain.
    closed: Option<(Frame, String)>,
    /// Everything from here on is the terminal message.
    terminal: bool,
}

impl Assembler {
    fn push(&mut self, tok: Token<'_>) {
        if tok.kind == TokenKind::Eof {
            return;
        }
        if self.terminal {
            self.message.push_str(tok.text);
            return;
        }
        if let Some((mut frame, raw)) = self.closed.take() {
            if tok.kind == TokenKind::Delimiter {
                frame.is_wrapper = true;
                self.frames.push(frame);
            } else {
                self.closed = Some((frame, raw));
                self.terminal = true;
                self.message.push_str(tok.text);
            }
            return;
        }

        match tok.kind {
            TokenKind::OpenFrame => self.open = Some(OpenFrame::new(tok.text)),
            TokenKind::CloseFrame => match self.open.take() {
                Some(open) => self.close(open, tok.text),
                None => self.message.push_str(tok.text),
            },
            _ => match self.open.as_mut() {
                Some(open) => open.push(&tok),
                None => self.message.push_str(tok.text),
            },
        }
    }

    fn close(&mut self, open: OpenFrame, closer: &str) {
        let (frame, raw) = match open.close(closer) {
            Ok(closed) => closed,
            Err(raw) => {
                debug!(frame = %raw, "non-canonical frame, keeping as text");
                self.message.push_str(&raw);
                return;
            }
        };
        if self.message.is_empty() {
            self.closed = Some((frame, raw));
            return;
        }
        // free text before a frame is a plain message wrapping it, rendered
        // as `<message> <frame>`; text that cannot render that way stays text
        match self.message.strip_suffix(' ') {
            Some(prefix) if !prefix.is_empty() => {
                let prefix = prefix.to_string();
                self.message.clear();
                self.frames.push(Frame::unstamped(prefix, true));
                self.closed = Some((frame, raw));
            }
            _ => {
                debug!(frame = %raw, "frame not separated from preceding text, keeping as text");
                self.message.push_str(&raw);
            }
        }
    }

    fn finish(mut self) -> Vec<Frame> {
        if let Some(open) = self.open.take() {
            debug!(frame = %open.raw, "unterminated frame, keeping as text");
            self.message.push_str(&open.raw);
        }
        let Some((mut frame, raw)) = self.closed.take() else {
            // empty after a trailing `; `
            self.frames.push(Frame::unstamped(self.message, false));
            return self.frames;
        };
        // a terminal frame renders as `<frame>` or `<frame> <message>`
        if self.message.is_empty() {
            self.frames.push(frame);
            return self.frames;
        }
        match self.message.strip_prefix(' ') {
            Some(rest) if !rest.is_empty() => {
                frame.message = rest.to_string();
                self.frames.push(frame);
            }
            _ => {
                debug!(frame = %raw, "frame not separated from its message, keeping as text");
                self.frames.push(Frame::unstamped(raw + &self.message, false));
            }
        }
        self.frames
    }
}

// ─── Public entry points ──────────────────────────────────────────────────────

/// Split canonical text into frames, outermost first.
///
/// ```rust
/// let frames = stamperr::frames("third generic error: [ts 100 kind x data 1]; [ts 200] inner");
/// assert_eq!(frames.len(), 3);
/// assert_eq!(frames[0].message, "third generic error:");
/// assert_eq!(frames[1].kind, "x");
/// assert_eq!(frames[2].message, "inner");
/// ```
pub fn frames(text: &str) -> Vec<Frame> {
    let mut asm = Assembler::default();
    for tok in Lexer::new(text) {
        asm.push(tok);
    }
    let frames = asm.finish();
    debug!(input_len = text.len(), frames = frames.len(), "assembled frames");
    frames
}

/// Rebuild a node chain from frames, innermost first.
pub fn reduce(frames: Vec<Frame>) -> StampedError {
    let mut acc: Option<StampedError> = None;
    for frame in frames.into_iter().rev() {
        trace!(stamp = ?frame.stamp, wrapper = frame.is_wrapper, "reducing frame");
        let node = match (frame.stamp, acc.take()) {
            (Some(stamp), Some(inner)) if frame.is_wrapper => {
                StampedError::around(Some(stamp), inner)
            }
            (None, Some(inner)) if frame.is_wrapper => {
                let mut node = StampedError::around(None, inner);
                node.message = frame.message;
                node
            }
            (stamp, _) => StampedError::terminal(stamp, frame.message),
        };
        acc = Some(node.with_recovered(frame.kind, frame.data));
    }
    acc.unwrap_or_else(|| StampedError::terminal(None, String::new()))
}

/// Parse canonical text back into a node chain.
///
/// Data payloads stay encoded until requested with a concrete type.
pub fn parse(text: &str) -> StampedError {
    reduce(frames(text))
}

//! Scanner for the canonical text form.
//!
//! Produces a flat token stream; every token borrows the exact source slice it
//! covers, so concatenating all token texts reproduces the input. The frame
//! assembler relies on that to fall back to raw text when a frame is malformed.

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `[` at depth 0 that starts a frame (it is followed by `ts `).
    OpenFrame,
    /// `]` that returns to depth 0.
    CloseFrame,
    /// `[` inside a frame, e.g. a list payload.
    NestedOpen,
    /// `]` inside a frame that does not close it.
    NestedClose,
    /// `ts ` right after the frame opener.
    Stamp,
    /// ` kind ` inside a frame, before any data.
    Kind,
    /// ` data ` inside a frame.
    Data,
    /// `; ` right after a frame closes.
    Delimiter,
    /// Any other single character.
    Literal,
    Eof,
}

/// A token and the slice of source it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub start: usize,
}

/// Which frame field subsequent literals belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Stamp,
    Kind,
    Data,
}

/// Pull-based scanner over a rendered error string.
pub struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
    depth: usize,
    field: Field,
    expect_stamp: bool,
    after_close: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            depth: 0,
            field: Field::Stamp,
            expect_stamp: false,
            after_close: false,
            finished: false,
        }
    }

    /// Pull the next token. Returns `Eof` at end of input, repeatedly.
    pub fn next_token(&mut self) -> Token<'a> {
        let start = self.cursor;
        let rest = &self.source[start..];
        let Some(ch) = rest.chars().next() else {
            self.finished = true;
            return Token {
                kind: TokenKind::Eof,
                text: "",
                start,
            };
        };

        let expect_stamp = std::mem::take(&mut self.expect_stamp);
        let after_close = std::mem::take(&mut self.after_close);

        let (kind, len) = match ch {
            '[' if self.depth == 0 => {
                if rest[1..].starts_with("ts ") {
                    self.depth = 1;
                    self.field = Field::Stamp;
                    self.expect_stamp = true;
                    (TokenKind::OpenFrame, 1)
                } else {
                    (TokenKind::Literal, 1)
                }
            }
            '[' => {
                self.depth += 1;
                (TokenKind::NestedOpen, 1)
            }
            ']' if self.depth == 0 => (TokenKind::Literal, 1),
            ']' => {
                self.depth -= 1;
                if self.depth == 0 {
                    self.after_close = true;
                    (TokenKind::CloseFrame, 1)
                } else {
                    (TokenKind::NestedClose, 1)
                }
            }
            't' if expect_stamp && rest.starts_with("ts ") => (TokenKind::Stamp, 3),
            ';' if after_close && rest.starts_with("; ") => (TokenKind::Delimiter, 2),
            ' ' if self.depth == 1 && self.field == Field::Stamp && rest.starts_with(" kind ") => {
                self.field = Field::Kind;
                (TokenKind::Kind, 6)
            }
            ' ' if self.depth == 1 && self.field != Field::Data && rest.starts_with(" data ") => {
                self.field = Field::Data;
                (TokenKind::Data, 6)
            }
            other => (TokenKind::Literal, other.len_utf8()),
        };

        self.cursor += len;
        Token {
            kind,
            text: &self.source[start..self.cursor],
            start,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields every token including a single trailing `Eof`.
    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    /// Collapse runs of literals so assertions stay readable.
    fn shape(src: &str) -> Vec<(TokenKind, String)> {
        let mut out: Vec<(TokenKind, String)> = Vec::new();
        for tok in Lexer::new(src) {
            match out.last_mut() {
                Some((Literal, text)) if tok.kind == Literal => text.push_str(tok.text),
                _ => out.push((tok.kind, tok.text.to_string())),
            }
        }
        out
    }

    #[test]
    fn empty_source_is_eof() {
        let mut lex = Lexer::new("");
        assert_eq!(lex.next_token().kind, Eof);
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn full_frame() {
        let toks = shape("[ts 12 kind x data 1]; m");
        let expected: Vec<(TokenKind, String)> = vec![
            (OpenFrame, "[".into()),
            (Stamp, "ts ".into()),
            (Literal, "12".into()),
            (Kind, " kind ".into()),
            (Literal, "x".into()),
            (Data, " data ".into()),
            (Literal, "1".into()),
            (CloseFrame, "]".into()),
            (Delimiter, "; ".into()),
            (Literal, "m".into()),
            (Eof, "".into()),
        ];
        assert_eq!(toks, expected);
    }

    #[test]
    fn nested_brackets_stay_inside_frame() {
        assert_eq!(
            kinds("[ts 1 data [2]]"),
            vec![
                OpenFrame, Stamp, Literal, Data, NestedOpen, Literal, NestedClose, CloseFrame, Eof
            ]
        );
    }

    #[test]
    fn brackets_without_stamp_are_literals() {
        assert!(kinds("oops [x]; y").iter().all(|k| matches!(k, Literal | Eof)));
    }

    #[test]
    fn delimiter_only_after_close() {
        assert!(!kinds("a; b").contains(&Delimiter));
        assert!(kinds("[ts 1]; b").contains(&Delimiter));
        assert!(!kinds("[ts 1] a; b").contains(&Delimiter));
    }

    #[test]
    fn directives_only_inside_frames() {
        let toks = kinds("the kind of data here");
        assert!(!toks.contains(&Kind));
        assert!(!toks.contains(&Data));
    }

    #[test]
    fn data_text_is_never_split() {
        // after `data ` a second ` data ` or ` kind ` is just text
        let toks = kinds("[ts 1 kind k data \"a data b kind c\"]");
        assert_eq!(toks.iter().filter(|k| **k == Data).count(), 1);
        assert_eq!(toks.iter().filter(|k| **k == Kind).count(), 1);
    }

    #[test]
    fn token_texts_reassemble_source() {
        let src = "ctx: [ts 3 kind k data {\"a\":[1]}]; [ts 2] ünïcode [x] ; end";
        let joined: String = Lexer::new(src).map(|t| t.text).collect();
        assert_eq!(joined, src);
    }
}

//! Minimal JavaScript tokenizer.
//!
//! Only distinguishes what brace matching needs: identifiers, single-byte
//! punctuation, string and template literals (with `${...}` nesting), and
//! comments. Regular expression literals are not recognised; the generated
//! module never contains one.

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Number,
    Punct(u8),
    Str,
    Template,
    LineComment,
    BlockComment,
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub(crate) fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub(crate) const fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// `/** ... */`, excluding the empty `/**/`.
    pub(crate) fn is_doc_block(&self, src: &str) -> bool {
        self.kind == TokenKind::BlockComment && {
            let text = self.text(src);
            text.starts_with("/**") && text.len() > 4
        }
    }
}

/// Byte-level tokenizer over a source string.
#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    unterminated: bool,
    unterminated_at: Option<usize>,
}

impl<'a> Lexer<'a> {
    pub(crate) const fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            unterminated: false,
            unterminated_at: None,
        }
    }

    /// Start offset of the first string, template or comment that ran into
    /// end of input.
    pub(crate) const fn unterminated_at(&self) -> Option<usize> {
        self.unterminated_at
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek(0).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn line_comment(&mut self) {
        while let Some(b) = self.peek(0) {
            if b == b'\n' {
                return;
            }
            self.pos += 1;
        }
    }

    fn block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.src.len() {
            if self.peek(0) == Some(b'*') && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
        self.unterminated = true;
    }

    fn string(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'\\' {
                self.pos += 1;
            } else if b == quote {
                return;
            }
        }
        self.pos = self.src.len();
        self.unterminated = true;
    }

    fn template(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.substitution();
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.src.len());
        self.unterminated = true;
    }

    /// Consumes tokens up to the `}` closing a `${` substitution.
    fn substitution(&mut self) {
        let mut depth = 0usize;
        for token in self.by_ref() {
            match token.kind {
                TokenKind::Punct(b'{') => depth += 1,
                TokenKind::Punct(b'}') if depth == 0 => return,
                TokenKind::Punct(b'}') => depth -= 1,
                _ => {}
            }
        }
        self.unterminated = true;
    }

    fn word(&mut self) {
        while self
            .peek(0)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80)
        {
            self.pos += 1;
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let start = self.pos;
        let b = self.peek(0)?;

        let kind = match b {
            b'/' if self.peek(1) == Some(b'/') => {
                self.line_comment();
                TokenKind::LineComment
            }
            b'/' if self.peek(1) == Some(b'*') => {
                self.block_comment();
                TokenKind::BlockComment
            }
            b'"' | b'\'' => {
                self.string(b);
                TokenKind::Str
            }
            b'`' => {
                self.template();
                TokenKind::Template
            }
            b if b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80 => {
                self.word();
                TokenKind::Ident
            }
            b if b.is_ascii_digit() => {
                self.word();
                TokenKind::Number
            }
            other => {
                self.pos += 1;
                TokenKind::Punct(other)
            }
        };

        if self.unterminated && self.unterminated_at.is_none() {
            self.unterminated_at = Some(start);
        }

        Some(Token {
            kind,
            start,
            end: self.pos,
        })
    }
}

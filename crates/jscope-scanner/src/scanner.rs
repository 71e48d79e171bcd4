//! Scanner state: turns source text into a flat token vector.
//!
//! Whitespace and comments are dropped. Unicode escapes outside literals are
//! not decoded; identifiers are ASCII letters, digits, `_`, `$` plus any
//! non-ASCII alphabetic character.

use crate::syntax_kind::{SyntaxKind, keyword_kind};
use jscope_common::diagnostics::{Diagnostic, diagnostic_codes};

/// A token and its byte range in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub pos: u32,
    pub end: u32,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.pos as usize..self.end as usize).unwrap_or("")
    }
}

/// Output of a full scan. The token vector always ends with `EndOfFileToken`.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ScannerState<'a> {
    file_name: &'a str,
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ScannerState<'a> {
    pub fn new(file_name: &'a str, source: &'a str) -> Self {
        ScannerState {
            file_name,
            source,
            bytes: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Scan the whole source.
    pub fn scan_all(mut self) -> ScanResult {
        let mut tokens = Vec::with_capacity(self.bytes.len() / 4 + 1);
        loop {
            let token = self.scan();
            tokens.push(token);
            if token.kind == SyntaxKind::EndOfFileToken {
                break;
            }
        }
        ScanResult {
            tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&mut self, start: usize, code: u32, args: &[&str]) {
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name,
            start as u32,
            (self.pos.max(start + 1) - start) as u32,
            code,
            args,
        ));
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek_byte(0) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => self.pos += 1,
                b'/' if self.peek_byte(1) == Some(b'/') => {
                    match memchr::memchr(b'\n', &self.bytes[self.pos..]) {
                        Some(offset) => self.pos += offset + 1,
                        None => self.pos = self.bytes.len(),
                    }
                }
                b'/' if self.peek_byte(1) == Some(b'*') => {
                    let start = self.pos;
                    match memchr::memmem::find(&self.bytes[self.pos + 2..], b"*/") {
                        Some(offset) => self.pos += offset + 4,
                        None => {
                            self.pos = self.bytes.len();
                            self.error(start, diagnostic_codes::UNTERMINATED_LITERAL, &["comment"]);
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let Some(b) = self.peek_byte(0) else {
            return Token {
                kind: SyntaxKind::EndOfFileToken,
                pos: start as u32,
                end: start as u32,
            };
        };

        let kind = match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.scan_identifier(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if matches!(self.peek_byte(1), Some(b'0'..=b'9')) => self.scan_number(),
            b'"' => self.scan_string(),
            b'\'' => self.scan_char(),
            _ if b >= 0x80 => {
                let ch = self.source[self.pos..].chars().next().unwrap_or('\u{fffd}');
                if ch.is_alphabetic() {
                    self.scan_identifier()
                } else {
                    self.pos += ch.len_utf8();
                    self.error(start, diagnostic_codes::UNEXPECTED_TOKEN, &[&ch.to_string()]);
                    SyntaxKind::Unknown
                }
            }
            _ => self.scan_punctuation(),
        };

        Token {
            kind,
            pos: start as u32,
            end: self.pos as u32,
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                self.pos += 1;
            } else if b >= 0x80 {
                match self.source[self.pos..].chars().next() {
                    Some(ch) if ch.is_alphanumeric() => self.pos += ch.len_utf8(),
                    _ => break,
                }
            } else {
                break;
            }
        }
        keyword_kind(&self.source[start..self.pos]).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_number(&mut self) -> SyntaxKind {
        // Covers decimal, hex, octal, binary, underscores, exponents and
        // type suffixes. Validity of the digits is not checked.
        while let Some(b) = self.peek_byte(0) {
            let in_exponent = matches!(b, b'+' | b'-')
                && self.pos > 0
                && matches!(self.bytes[self.pos - 1], b'e' | b'E' | b'p' | b'P')
                && !self.is_hex_literal();
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || in_exponent {
                if b == b'.' && !matches!(self.peek_byte(1), Some(b'0'..=b'9')) {
                    // `1.` followed by a member name, e.g. `1.toString`, is not a literal.
                    if matches!(self.peek_byte(1), Some(c) if c.is_ascii_alphabetic()) {
                        break;
                    }
                }
                self.pos += 1;
            } else {
                break;
            }
        }
        SyntaxKind::NumericLiteral
    }

    fn is_hex_literal(&self) -> bool {
        let mut i = self.pos;
        while i > 0 && (self.bytes[i - 1].is_ascii_alphanumeric() || self.bytes[i - 1] == b'_') {
            i -= 1;
        }
        matches!(self.bytes.get(i..i + 2), Some([b'0', b'x' | b'X']))
    }

    fn scan_string(&mut self) -> SyntaxKind {
        let start = self.pos;
        if self.bytes[self.pos..].starts_with(b"\"\"\"") {
            self.pos += 3;
            while self.pos < self.bytes.len() {
                if self.bytes[self.pos] == b'\\' {
                    self.pos += 2;
                } else if self.bytes[self.pos..].starts_with(b"\"\"\"") {
                    self.pos += 3;
                    return SyntaxKind::TextBlockLiteral;
                } else {
                    self.pos += 1;
                }
            }
            self.pos = self.bytes.len();
            self.error(start, diagnostic_codes::UNTERMINATED_LITERAL, &["text block"]);
            return SyntaxKind::TextBlockLiteral;
        }
        self.scan_quoted(b'"', "string");
        SyntaxKind::StringLiteral
    }

    fn scan_char(&mut self) -> SyntaxKind {
        self.scan_quoted(b'\'', "character");
        SyntaxKind::CharacterLiteral
    }

    fn scan_quoted(&mut self, quote: u8, what: &str) {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'\\' => self.pos += 2,
                b'\n' => break,
                _ if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
        self.error(start, diagnostic_codes::UNTERMINATED_LITERAL, &[what]);
    }

    fn scan_punctuation(&mut self) -> SyntaxKind {
        let b0 = self.bytes[self.pos];
        let b1 = self.peek_byte(1);
        let b2 = self.peek_byte(2);

        let (kind, len) = match (b0, b1, b2) {
            (b'.', Some(b'.'), Some(b'.')) => (SyntaxKind::DotDotDotToken, 3),
            (b'<', Some(b'<'), Some(b'=')) => (SyntaxKind::LessThanLessThanEqualsToken, 3),
            (b':', Some(b':'), _) => (SyntaxKind::ColonColonToken, 2),
            (b'-', Some(b'>'), _) => (SyntaxKind::ArrowToken, 2),
            (b'=', Some(b'='), _) => (SyntaxKind::EqualsEqualsToken, 2),
            (b'!', Some(b'='), _) => (SyntaxKind::ExclamationEqualsToken, 2),
            (b'>', Some(b'='), _) => (SyntaxKind::GreaterThanEqualsToken, 2),
            (b'<', Some(b'='), _) => (SyntaxKind::LessThanEqualsToken, 2),
            (b'<', Some(b'<'), _) => (SyntaxKind::LessThanLessThanToken, 2),
            (b'&', Some(b'&'), _) => (SyntaxKind::AmpersandAmpersandToken, 2),
            (b'|', Some(b'|'), _) => (SyntaxKind::BarBarToken, 2),
            (b'+', Some(b'+'), _) => (SyntaxKind::PlusPlusToken, 2),
            (b'-', Some(b'-'), _) => (SyntaxKind::MinusMinusToken, 2),
            (b'+', Some(b'='), _) => (SyntaxKind::PlusEqualsToken, 2),
            (b'-', Some(b'='), _) => (SyntaxKind::MinusEqualsToken, 2),
            (b'*', Some(b'='), _) => (SyntaxKind::AsteriskEqualsToken, 2),
            (b'/', Some(b'='), _) => (SyntaxKind::SlashEqualsToken, 2),
            (b'%', Some(b'='), _) => (SyntaxKind::PercentEqualsToken, 2),
            (b'&', Some(b'='), _) => (SyntaxKind::AmpersandEqualsToken, 2),
            (b'|', Some(b'='), _) => (SyntaxKind::BarEqualsToken, 2),
            (b'^', Some(b'='), _) => (SyntaxKind::CaretEqualsToken, 2),
            (b'(', _, _) => (SyntaxKind::OpenParenToken, 1),
            (b')', _, _) => (SyntaxKind::CloseParenToken, 1),
            (b'{', _, _) => (SyntaxKind::OpenBraceToken, 1),
            (b'}', _, _) => (SyntaxKind::CloseBraceToken, 1),
            (b'[', _, _) => (SyntaxKind::OpenBracketToken, 1),
            (b']', _, _) => (SyntaxKind::CloseBracketToken, 1),
            (b';', _, _) => (SyntaxKind::SemicolonToken, 1),
            (b',', _, _) => (SyntaxKind::CommaToken, 1),
            (b'.', _, _) => (SyntaxKind::DotToken, 1),
            (b'@', _, _) => (SyntaxKind::AtToken, 1),
            (b':', _, _) => (SyntaxKind::ColonToken, 1),
            (b'?', _, _) => (SyntaxKind::QuestionToken, 1),
            (b'=', _, _) => (SyntaxKind::EqualsToken, 1),
            (b'>', _, _) => (SyntaxKind::GreaterThanToken, 1),
            (b'<', _, _) => (SyntaxKind::LessThanToken, 1),
            (b'!', _, _) => (SyntaxKind::ExclamationToken, 1),
            (b'~', _, _) => (SyntaxKind::TildeToken, 1),
            (b'+', _, _) => (SyntaxKind::PlusToken, 1),
            (b'-', _, _) => (SyntaxKind::MinusToken, 1),
            (b'*', _, _) => (SyntaxKind::AsteriskToken, 1),
            (b'/', _, _) => (SyntaxKind::SlashToken, 1),
            (b'%', _, _) => (SyntaxKind::PercentToken, 1),
            (b'&', _, _) => (SyntaxKind::AmpersandToken, 1),
            (b'|', _, _) => (SyntaxKind::BarToken, 1),
            (b'^', _, _) => (SyntaxKind::CaretToken, 1),
            _ => {
                let start = self.pos;
                self.pos += 1;
                let text = (b0 as char).to_string();
                self.error(start, diagnostic_codes::UNEXPECTED_TOKEN, &[&text]);
                return SyntaxKind::Unknown;
            }
        };
        self.pos += len;
        kind
    }
}

//! Parser state - token cursor, diagnostics and compilation-unit entry point.

use super::base::{NodeIndex, NodeList};
use super::node::{CompilationUnitData, NameData, NodeArena, NodeData, NodeKind};
use jscope_common::diagnostics::{Diagnostic, diagnostic_codes};
use jscope_common::limits::MAX_PARSE_DEPTH;
use jscope_scanner::{ScannerState, SyntaxKind, Token};
use std::fmt;
use tracing::{debug, trace};

/// Fatal parse failure. Ordinary syntax errors are diagnostics instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Input nesting exceeded [`MAX_PARSE_DEPTH`].
    NestingTooDeep { pos: u32, limit: u32 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NestingTooDeep { pos, limit } => write!(
                f,
                "syntax nesting deeper than {limit} levels at offset {pos}"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub struct ParserState {
    pub(crate) file_name: String,
    pub(crate) source: String,
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    pub(crate) arena: NodeArena,
    pub(crate) diagnostics: Vec<Diagnostic>,
    depth: u32,
    fatal: Option<ParseError>,
}

impl ParserState {
    pub fn new(file_name: String, source: String) -> Self {
        let scan = ScannerState::new(&file_name, &source).scan_all();
        let capacity = scan.tokens.len();
        ParserState {
            tokens: scan.tokens,
            diagnostics: scan.diagnostics,
            file_name,
            source,
            current: 0,
            arena: NodeArena::with_capacity(capacity),
            depth: 0,
            fatal: None,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (NodeArena, Vec<Diagnostic>) {
        (self.arena, self.diagnostics)
    }

    // =========================================================================
    // Entry point
    // =========================================================================

    /// Parse a compilation unit: package, imports and top-level types.
    pub fn parse_compilation_unit(&mut self) -> Result<NodeIndex, ParseError> {
        let _span = tracing::debug_span!("parse_compilation_unit", file = %self.file_name).entered();

        let mut data = CompilationUnitData {
            file_name: self.file_name.clone(),
            ..CompilationUnitData::default()
        };
        let mut types = Vec::new();

        self.skip_annotations();
        if self.is(SyntaxKind::PackageKeyword) {
            self.next_token();
            data.package_name = Some(self.parse_qualified_name_text());
            self.parse_expected(SyntaxKind::SemicolonToken);
        }

        while !self.is(SyntaxKind::EndOfFileToken) && self.fatal.is_none() {
            let start = self.current;
            if self.is(SyntaxKind::ImportKeyword) {
                self.next_token();
                let is_static = self.parse_optional(SyntaxKind::StaticKeyword);
                let mut name = self.parse_qualified_name_text();
                if self.parse_optional(SyntaxKind::DotToken) {
                    self.parse_expected(SyntaxKind::AsteriskToken);
                    name.push_str(".*");
                }
                if is_static {
                    name.insert_str(0, "static ");
                }
                data.imports.push(name);
                self.parse_expected(SyntaxKind::SemicolonToken);
            } else if self.parse_optional(SyntaxKind::SemicolonToken) {
            } else {
                let member_start = self.token_pos();
                let modifiers = self.parse_modifiers(true);
                if self.is_type_declaration_start() {
                    let decl = self.parse_type_declaration(member_start, modifiers);
                    if decl.is_some() {
                        types.push(decl);
                    }
                } else {
                    self.error_unexpected();
                }
            }
            if self.current == start {
                self.next_token();
            }
        }

        if let Some(err) = self.fatal.take() {
            return Err(err);
        }

        data.types = NodeList::from(types);
        let end = self.source.len() as u32;
        let root = self
            .arena
            .add_node(NodeKind::CompilationUnit, 0, end, NodeData::CompilationUnit(data));
        self.arena.link_parents(root);
        debug!(
            nodes = self.arena.len(),
            diagnostics = self.diagnostics.len(),
            "parsed compilation unit"
        );
        Ok(root)
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> Token {
        self.token_at(self.current)
    }

    #[inline]
    pub(crate) fn token_at(&self, i: usize) -> Token {
        match self.tokens.get(i) {
            Some(&t) => t,
            // The vector always ends with EndOfFileToken.
            None => self.tokens[self.tokens.len() - 1],
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> SyntaxKind {
        self.token().kind
    }

    #[inline]
    pub(crate) fn kind_at(&self, i: usize) -> SyntaxKind {
        self.token_at(i).kind
    }

    #[inline]
    pub(crate) fn peek_kind(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.current + n)
    }

    #[inline]
    pub(crate) fn is(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn text_at(&self, i: usize) -> &str {
        self.token_at(i).text(&self.source)
    }

    pub(crate) fn token_text(&self) -> &str {
        self.text_at(self.current)
    }

    /// Current token is an identifier spelled `text` (contextual keywords).
    pub(crate) fn is_contextual(&self, text: &str) -> bool {
        self.is(SyntaxKind::Identifier) && self.token_text() == text
    }

    pub(crate) fn token_pos(&self) -> u32 {
        self.token().pos
    }

    /// End offset of the last consumed token.
    pub(crate) fn prev_end(&self) -> u32 {
        if self.current == 0 {
            0
        } else {
            self.token_at(self.current - 1).end
        }
    }

    pub(crate) fn next_token(&mut self) {
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let found = self.describe_current();
        let token = self.token();
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name.as_str(),
            token.pos,
            token.end.saturating_sub(token.pos).max(1),
            diagnostic_codes::EXPECTED_TOKEN,
            &[kind.text(), found.as_str()],
        ));
        trace!(expected = kind.text(), found = %found, "parse_expected failed");
        false
    }

    fn describe_current(&self) -> String {
        match self.kind() {
            SyntaxKind::EndOfFileToken => SyntaxKind::EndOfFileToken.text().to_string(),
            _ => self.token_text().to_string(),
        }
    }

    pub(crate) fn error_unexpected(&mut self) {
        let found = self.describe_current();
        let token = self.token();
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name.as_str(),
            token.pos,
            token.end.saturating_sub(token.pos).max(1),
            diagnostic_codes::UNEXPECTED_TOKEN,
            &[found.as_str()],
        ));
    }

    pub(crate) fn error_unsupported(&mut self, pos: u32, end: u32, what: &str) {
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name.as_str(),
            pos,
            end.saturating_sub(pos).max(1),
            diagnostic_codes::UNSUPPORTED_SYNTAX,
            &[what],
        ));
    }

    // =========================================================================
    // Nesting guard
    // =========================================================================

    /// Enter one nesting level. Returns false once the limit is exceeded; the
    /// parse then unwinds and `parse_compilation_unit` reports the failure.
    pub(crate) fn enter_nested(&mut self) -> bool {
        if self.fatal.is_some() {
            return false;
        }
        if self.depth >= MAX_PARSE_DEPTH {
            self.fatal = Some(ParseError::NestingTooDeep {
                pos: self.token_pos(),
                limit: MAX_PARSE_DEPTH,
            });
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn exit_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.fatal.is_some()
    }

    // =========================================================================
    // Small node builders
    // =========================================================================

    /// Finish a node that started at `pos` and ends at the last consumed token.
    pub(crate) fn finish_node(&mut self, kind: NodeKind, pos: u32, data: NodeData) -> NodeIndex {
        let end = self.prev_end().max(pos);
        self.arena.add_node(kind, pos, end, data)
    }

    /// Consume an identifier and build an `Identifier` node for it.
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if !self.is(SyntaxKind::Identifier) {
            self.parse_expected(SyntaxKind::Identifier);
            return NodeIndex::NONE;
        }
        let token = self.token();
        let name = self.token_text().to_string();
        self.next_token();
        self.arena.add_node(
            NodeKind::Identifier,
            token.pos,
            token.end,
            NodeData::Name(NameData { name }),
        )
    }

    /// `a.b.c` as plain text (package and import names).
    pub(crate) fn parse_qualified_name_text(&mut self) -> String {
        let mut name = String::new();
        if self.is(SyntaxKind::Identifier) {
            name.push_str(self.token_text());
            self.next_token();
        } else {
            self.parse_expected(SyntaxKind::Identifier);
            return name;
        }
        while self.is(SyntaxKind::DotToken) && self.peek_kind(1) == SyntaxKind::Identifier {
            self.next_token();
            name.push('.');
            name.push_str(self.token_text());
            self.next_token();
        }
        name
    }
}

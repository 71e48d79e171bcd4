//! Parser state - types, modifiers, annotations and lookahead.
//!
//! Types never contain name uses, so they are recognised with a token-level
//! scan (`scan_type`) and materialised as a single `TypeReference` node.

use super::base::NodeIndex;
use super::flags::ModifierFlags;
use super::node::{NodeData, NodeKind, TypeReferenceData};
use super::state::ParserState;
use jscope_common::limits::MAX_LOOKAHEAD_TOKENS;
use jscope_scanner::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Modifiers and annotations
    // =========================================================================

    /// Parse modifiers and annotations.
    ///
    /// `allow_default` is false in statement context, where `default` starts
    /// a switch label instead of modifying an interface method.
    pub(crate) fn parse_modifiers(&mut self, allow_default: bool) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        loop {
            let flag = match self.kind() {
                SyntaxKind::AtToken if self.peek_kind(1) != SyntaxKind::InterfaceKeyword => {
                    self.skip_annotation();
                    continue;
                }
                SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
                SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
                SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
                SyntaxKind::StaticKeyword => ModifierFlags::STATIC,
                SyntaxKind::FinalKeyword => ModifierFlags::FINAL,
                SyntaxKind::AbstractKeyword => ModifierFlags::ABSTRACT,
                SyntaxKind::NativeKeyword => ModifierFlags::NATIVE,
                SyntaxKind::SynchronizedKeyword if self.peek_kind(1) != SyntaxKind::OpenParenToken => {
                    ModifierFlags::SYNCHRONIZED
                }
                SyntaxKind::TransientKeyword => ModifierFlags::TRANSIENT,
                SyntaxKind::VolatileKeyword => ModifierFlags::VOLATILE,
                SyntaxKind::StrictFpKeyword => ModifierFlags::STRICTFP,
                SyntaxKind::DefaultKeyword
                    if allow_default
                        && !matches!(
                            self.peek_kind(1),
                            SyntaxKind::ColonToken | SyntaxKind::ArrowToken
                        ) =>
                {
                    ModifierFlags::DEFAULT
                }
                SyntaxKind::Identifier if self.is_sealed_modifier() => {
                    if self.token_text() == "non" {
                        // `non` `-` `sealed`
                        self.next_token();
                        self.next_token();
                        ModifierFlags::NON_SEALED
                    } else {
                        ModifierFlags::SEALED
                    }
                }
                _ => break,
            };
            flags |= flag;
            self.next_token();
        }
        flags
    }

    fn is_sealed_modifier(&self) -> bool {
        let text = self.token_text();
        if text == "sealed" {
            let next = self.peek_kind(1);
            return next.is_keyword() && next != SyntaxKind::InstanceOfKeyword;
        }
        text == "non"
            && self.peek_kind(1) == SyntaxKind::MinusToken
            && self.kind_at(self.current + 2) == SyntaxKind::Identifier
            && self.text_at(self.current + 2) == "sealed"
    }

    pub(crate) fn skip_annotations(&mut self) {
        while self.is(SyntaxKind::AtToken) && self.peek_kind(1) != SyntaxKind::InterfaceKeyword {
            self.skip_annotation();
        }
    }

    /// `@Name`, `@a.b.Name`, `@Name(...)`. Arguments are skipped wholesale.
    fn skip_annotation(&mut self) {
        self.next_token();
        self.parse_qualified_name_text();
        if self.is(SyntaxKind::OpenParenToken) {
            self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
        }
    }

    /// Skip from an opening token to its matching close, inclusive.
    pub(crate) fn skip_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) {
        let mut depth = 0usize;
        loop {
            let kind = self.kind();
            if kind == SyntaxKind::EndOfFileToken {
                self.parse_expected(close);
                return;
            }
            self.next_token();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }

    /// Skip `<T extends A & B, U>` at the cursor, if present.
    pub(crate) fn skip_type_parameters(&mut self) {
        if self.is(SyntaxKind::LessThanToken) {
            self.skip_balanced(SyntaxKind::LessThanToken, SyntaxKind::GreaterThanToken);
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Token index just past a type starting at `i`, or `None` if no type
    /// starts there.
    pub(crate) fn scan_type(&self, i: usize) -> Option<usize> {
        let mut i = self.scan_annotations(i)?;
        let kind = self.kind_at(i);
        if kind.is_primitive_type() {
            i += 1;
        } else if kind == SyntaxKind::Identifier {
            i += 1;
            if self.kind_at(i) == SyntaxKind::LessThanToken {
                i = self.scan_type_arguments(i)?;
            }
            while self.kind_at(i) == SyntaxKind::DotToken {
                let after = self.scan_annotations(i + 1)?;
                if self.kind_at(after) != SyntaxKind::Identifier {
                    break;
                }
                i = after + 1;
                if self.kind_at(i) == SyntaxKind::LessThanToken {
                    i = self.scan_type_arguments(i)?;
                }
            }
        } else {
            return None;
        }
        loop {
            let after = self.scan_annotations(i)?;
            if self.kind_at(after) == SyntaxKind::OpenBracketToken
                && self.kind_at(after + 1) == SyntaxKind::CloseBracketToken
            {
                i = after + 2;
            } else {
                break;
            }
        }
        Some(i)
    }

    fn scan_type_arguments(&self, mut i: usize) -> Option<usize> {
        debug_assert_eq!(self.kind_at(i), SyntaxKind::LessThanToken);
        i += 1;
        if self.kind_at(i) == SyntaxKind::GreaterThanToken {
            return Some(i + 1);
        }
        loop {
            i = self.scan_annotations(i)?;
            if self.kind_at(i) == SyntaxKind::QuestionToken {
                i += 1;
                if matches!(
                    self.kind_at(i),
                    SyntaxKind::ExtendsKeyword | SyntaxKind::SuperKeyword
                ) {
                    i = self.scan_type(i + 1)?;
                }
            } else {
                i = self.scan_type(i)?;
            }
            match self.kind_at(i) {
                SyntaxKind::CommaToken => i += 1,
                SyntaxKind::GreaterThanToken => return Some(i + 1),
                _ => return None,
            }
        }
    }

    /// Skip annotations during lookahead. `None` on malformed arguments.
    fn scan_annotations(&self, mut i: usize) -> Option<usize> {
        while self.kind_at(i) == SyntaxKind::AtToken
            && self.kind_at(i + 1) == SyntaxKind::Identifier
        {
            i += 2;
            while self.kind_at(i) == SyntaxKind::DotToken
                && self.kind_at(i + 1) == SyntaxKind::Identifier
            {
                i += 2;
            }
            if self.kind_at(i) == SyntaxKind::OpenParenToken {
                i = self.scan_balanced(i, SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken)?;
            }
        }
        Some(i)
    }

    /// Index past the token closing the group opened at `i`.
    pub(crate) fn scan_balanced(&self, mut i: usize, open: SyntaxKind, close: SyntaxKind) -> Option<usize> {
        let start = i;
        let mut depth = 0usize;
        loop {
            let kind = self.kind_at(i);
            if kind == SyntaxKind::EndOfFileToken || i - start > MAX_LOOKAHEAD_TOKENS {
                return None;
            }
            i += 1;
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    }

    /// Parse a type at the cursor into a `TypeReference` node.
    ///
    /// Also accepts `A | B` (catch parameters) and `A & B` (cast targets)
    /// when `allow_union` is set.
    pub(crate) fn parse_type_reference(&mut self, allow_union: bool) -> NodeIndex {
        let pos = self.token_pos();
        let Some(mut end) = self.scan_type(self.current) else {
            self.parse_expected(SyntaxKind::Identifier);
            return NodeIndex::NONE;
        };
        while allow_union
            && matches!(self.kind_at(end), SyntaxKind::BarToken | SyntaxKind::AmpersandToken)
        {
            match self.scan_type(end + 1) {
                Some(next) => end = next,
                None => break,
            }
        }
        self.current = end;
        self.type_reference_node(pos)
    }

    /// Build a `TypeReference` for the source text from `pos` to the last
    /// consumed token.
    pub(crate) fn type_reference_node(&mut self, pos: u32) -> NodeIndex {
        let end = self.prev_end();
        let text = self
            .source
            .get(pos as usize..end as usize)
            .unwrap_or("")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        self.arena.add_node(
            NodeKind::TypeReference,
            pos,
            end,
            NodeData::TypeReference(TypeReferenceData { text }),
        )
    }

    /// Skip `[]` pairs after a declarator name (`int x[]`).
    pub(crate) fn skip_dimensions(&mut self) {
        while self.is(SyntaxKind::OpenBracketToken) && self.peek_kind(1) == SyntaxKind::CloseBracketToken {
            self.next_token();
            self.next_token();
        }
    }

    // =========================================================================
    // Lookahead predicates
    // =========================================================================

    pub(crate) fn is_type_declaration_start(&self) -> bool {
        match self.kind() {
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword => true,
            SyntaxKind::AtToken => self.peek_kind(1) == SyntaxKind::InterfaceKeyword,
            SyntaxKind::Identifier => self.is_record_declaration_start(),
            _ => false,
        }
    }

    pub(crate) fn is_record_declaration_start(&self) -> bool {
        self.is_contextual("record")
            && self.peek_kind(1) == SyntaxKind::Identifier
            && matches!(
                self.peek_kind(2),
                SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
            )
    }

    /// `Type name` follows at the cursor, with the name followed by one of
    /// the tokens that can continue a declarator.
    pub(crate) fn is_local_variable_declaration_start(&self) -> bool {
        let Some(end) = self.scan_type(self.current) else {
            return false;
        };
        self.kind_at(end) == SyntaxKind::Identifier
            && matches!(
                self.kind_at(end + 1),
                SyntaxKind::EqualsToken
                    | SyntaxKind::SemicolonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::ColonToken
            )
    }
}

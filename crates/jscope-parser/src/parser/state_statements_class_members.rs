//! Parser state - type declarations and class members.

use super::base::{NodeIndex, NodeList};
use super::flags::ModifierFlags;
use super::node::{
    EnumConstantData, InitializerData, MethodData, NodeData, NodeKind, ParameterData, TypeDeclData,
    VariableData, VariableDeclaratorData,
};
use super::state::ParserState;
use jscope_scanner::SyntaxKind;
use tracing::trace;

impl ParserState {
    /// Parse a class, interface, enum, record or annotation type declaration.
    ///
    /// The cursor is on the declaring keyword; `pos` and `modifiers` cover
    /// whatever preceded it.
    pub(crate) fn parse_type_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> NodeIndex {
        if !self.enter_nested() {
            return NodeIndex::NONE;
        }

        let kind = match self.kind() {
            SyntaxKind::ClassKeyword => NodeKind::ClassDeclaration,
            SyntaxKind::InterfaceKeyword => NodeKind::InterfaceDeclaration,
            SyntaxKind::EnumKeyword => NodeKind::EnumDeclaration,
            SyntaxKind::AtToken => {
                self.next_token();
                NodeKind::AnnotationTypeDeclaration
            }
            _ => NodeKind::RecordDeclaration,
        };
        self.next_token();

        let name = self.parse_identifier();
        let type_name = self.arena.get_identifier_name(name).map(str::to_string);
        trace!(?kind, name = ?type_name, "parse_type_declaration");
        self.skip_type_parameters();

        let is_record = kind == NodeKind::RecordDeclaration;
        let components = if is_record {
            self.parse_record_components()
        } else {
            NodeList::new()
        };
        self.skip_type_header();

        let mut enum_constants = Vec::new();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            if kind == NodeKind::EnumDeclaration {
                enum_constants = self.parse_enum_constants();
            }
            members = self.parse_member_list(type_name.as_deref(), is_record);
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }

        self.exit_nested();
        self.finish_node(
            kind,
            pos,
            NodeData::TypeDecl(TypeDeclData {
                modifiers,
                name,
                components,
                enum_constants: enum_constants.into(),
                members: members.into(),
            }),
        )
    }

    /// Skip `extends`, `implements` and `permits` clauses up to the body.
    fn skip_type_header(&mut self) {
        while !matches!(
            self.kind(),
            SyntaxKind::OpenBraceToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::EndOfFileToken
        ) {
            if self.is(SyntaxKind::LessThanToken) {
                self.skip_balanced(SyntaxKind::LessThanToken, SyntaxKind::GreaterThanToken);
            } else {
                self.next_token();
            }
        }
    }

    /// `{ member* }` for anonymous classes and enum constant bodies.
    pub(crate) fn parse_anonymous_class_body(&mut self) -> NodeList {
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return NodeList::new();
        }
        if !self.enter_nested() {
            return NodeList::new();
        }
        let members = self.parse_member_list(None, false);
        self.exit_nested();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members.into()
    }

    fn parse_member_list(&mut self, type_name: Option<&str>, is_record: bool) -> Vec<NodeIndex> {
        let mut members = Vec::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) && !self.is_aborted()
        {
            let start = self.current;
            let member = self.parse_class_member(type_name, is_record);
            if member.is_some() {
                members.push(member);
            }
            if self.current == start {
                self.error_unexpected();
                self.next_token();
            }
        }
        members
    }

    fn parse_class_member(&mut self, type_name: Option<&str>, is_record: bool) -> NodeIndex {
        let pos = self.token_pos();
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return NodeIndex::NONE;
        }

        if self.is(SyntaxKind::OpenBraceToken)
            || (self.is(SyntaxKind::StaticKeyword) && self.peek_kind(1) == SyntaxKind::OpenBraceToken)
        {
            let is_static = self.parse_optional(SyntaxKind::StaticKeyword);
            let body = self.parse_block();
            return self.finish_node(
                NodeKind::Initializer,
                pos,
                NodeData::Initializer(InitializerData { is_static, body }),
            );
        }

        let modifiers = self.parse_modifiers(true);
        if self.is_type_declaration_start() {
            return self.parse_type_declaration(pos, modifiers);
        }
        self.skip_type_parameters();

        if let Some(type_name) = type_name
            && self.is(SyntaxKind::Identifier)
            && self.token_text() == type_name
        {
            match self.peek_kind(1) {
                SyntaxKind::OpenParenToken => {
                    return self.parse_method_rest(pos, modifiers, NodeIndex::NONE, NodeKind::ConstructorDeclaration);
                }
                SyntaxKind::OpenBraceToken if is_record => {
                    let name = self.parse_identifier();
                    let body = self.parse_block();
                    return self.finish_node(
                        NodeKind::CompactConstructorDeclaration,
                        pos,
                        NodeData::Method(MethodData {
                            modifiers,
                            name,
                            return_type: NodeIndex::NONE,
                            parameters: NodeList::new(),
                            body,
                            default_value: NodeIndex::NONE,
                        }),
                    );
                }
                _ => {}
            }
        }

        let type_ref = self.parse_type_reference(false);
        if type_ref.is_none() {
            return NodeIndex::NONE;
        }
        if self.is(SyntaxKind::Identifier) && self.peek_kind(1) == SyntaxKind::OpenParenToken {
            return self.parse_method_rest(pos, modifiers, type_ref, NodeKind::MethodDeclaration);
        }

        let declarators = self.parse_variable_declarators();
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.finish_node(
            NodeKind::FieldDeclaration,
            pos,
            NodeData::Variable(VariableData {
                modifiers,
                type_ref,
                declarators,
            }),
        )
    }

    /// Name, parameters, `throws`, annotation default and body of a method
    /// or constructor.
    fn parse_method_rest(
        &mut self,
        pos: u32,
        modifiers: ModifierFlags,
        return_type: NodeIndex,
        kind: NodeKind,
    ) -> NodeIndex {
        let name = self.parse_identifier();
        let parameters = self.parse_formal_parameters();
        self.skip_dimensions();

        if self.parse_optional(SyntaxKind::ThrowsKeyword) {
            loop {
                self.parse_type_reference(false);
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }

        let mut default_value = NodeIndex::NONE;
        if self.parse_optional(SyntaxKind::DefaultKeyword) {
            if self.is(SyntaxKind::AtToken) {
                self.skip_annotations();
            } else {
                default_value = self.parse_variable_initializer();
            }
        }

        let body = if self.is(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_expected(SyntaxKind::SemicolonToken);
            NodeIndex::NONE
        };

        self.finish_node(
            kind,
            pos,
            NodeData::Method(MethodData {
                modifiers,
                name,
                return_type,
                parameters,
                body,
                default_value,
            }),
        )
    }

    /// `name [= init], name [= init] ...` shared by fields and locals.
    pub(crate) fn parse_variable_declarators(&mut self) -> NodeList {
        let mut declarators = Vec::new();
        loop {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            if name.is_none() {
                break;
            }
            self.skip_dimensions();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_variable_initializer()
            } else {
                NodeIndex::NONE
            };
            declarators.push(self.finish_node(
                NodeKind::VariableDeclarator,
                pos,
                NodeData::VariableDeclarator(VariableDeclaratorData { name, initializer }),
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        declarators.into()
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// `( [param {, param}] )`, skipping an explicit `this` receiver.
    pub(crate) fn parse_formal_parameters(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::new();
        }
        while !matches!(
            self.kind(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let start = self.current;
            if self.is_receiver_parameter() {
                while !matches!(
                    self.kind(),
                    SyntaxKind::CommaToken | SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
                ) {
                    self.next_token();
                }
            } else {
                let parameter = self.parse_parameter(NodeKind::Parameter);
                if parameter.is_some() {
                    parameters.push(parameter);
                }
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                if self.current == start {
                    self.next_token();
                }
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        parameters.into()
    }

    fn is_receiver_parameter(&self) -> bool {
        let Some(mut end) = self.scan_type(self.current) else {
            return false;
        };
        while self.kind_at(end) == SyntaxKind::Identifier && self.kind_at(end + 1) == SyntaxKind::DotToken {
            end += 2;
        }
        self.kind_at(end) == SyntaxKind::ThisKeyword
    }

    fn parse_record_components(&mut self) -> NodeList {
        let mut components = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::new();
        }
        while !matches!(
            self.kind(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let start = self.current;
            let component = self.parse_parameter(NodeKind::RecordComponent);
            if component.is_some() {
                components.push(component);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                if self.current == start {
                    self.next_token();
                }
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        components.into()
    }

    /// `[modifiers] Type [...] name [dims]` as a `Parameter` or
    /// `RecordComponent` node.
    pub(crate) fn parse_parameter(&mut self, kind: NodeKind) -> NodeIndex {
        let pos = self.token_pos();
        let modifiers = self.parse_modifiers(false);
        let type_ref = self.parse_type_reference(kind == NodeKind::Parameter);
        if type_ref.is_none() {
            return NodeIndex::NONE;
        }
        self.skip_annotations();
        let is_varargs = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = self.parse_identifier();
        if name.is_none() {
            return NodeIndex::NONE;
        }
        self.skip_dimensions();
        self.finish_node(
            kind,
            pos,
            NodeData::Parameter(ParameterData {
                modifiers,
                type_ref,
                name,
                is_varargs,
            }),
        )
    }

    // =========================================================================
    // Enum constants
    // =========================================================================

    fn parse_enum_constants(&mut self) -> Vec<NodeIndex> {
        let mut constants = Vec::new();
        while matches!(self.kind(), SyntaxKind::Identifier | SyntaxKind::AtToken) {
            let pos = self.token_pos();
            self.skip_annotations();
            let name = self.parse_identifier();
            if name.is_none() {
                break;
            }
            let arguments = if self.is(SyntaxKind::OpenParenToken) {
                self.parse_arguments()
            } else {
                NodeList::new()
            };
            let body = self
                .is(SyntaxKind::OpenBraceToken)
                .then(|| self.parse_anonymous_class_body());
            constants.push(self.finish_node(
                NodeKind::EnumConstant,
                pos,
                NodeData::EnumConstant(EnumConstantData { name, arguments, body }),
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_optional(SyntaxKind::SemicolonToken);
        constants
    }
}

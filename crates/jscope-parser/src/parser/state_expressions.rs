//! Parser state - expressions.
//!
//! Precedence climbing over binary operators, with lambdas recognised at the
//! assignment level and casts disambiguated by token lookahead.

use super::base::{NodeIndex, NodeList};
use super::node::{
    ArrayAccessData, ArrayCreationData, ArrayInitializerData, BinaryData, CastData,
    ClassLiteralData, ConditionalData, ExprData, FieldAccessData, InstanceOfData, LambdaData,
    LiteralData, MethodCallData, MethodReferenceData, NameData, NodeData, NodeKind,
    ObjectCreationData, ParameterData, SwitchData, ThisData, TypeReferenceData, UnaryData,
};
use super::flags::ModifierFlags;
use super::state::ParserState;
use jscope_scanner::SyntaxKind;

/// Binding power of `instanceof` and the relational operators.
const RELATIONAL_PRECEDENCE: u8 = 7;

impl ParserState {
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        self.parse_assignment_expression()
    }

    /// Array initializer or expression, as allowed after `=` in a declarator.
    pub(crate) fn parse_variable_initializer(&mut self) -> NodeIndex {
        if self.is(SyntaxKind::OpenBraceToken) {
            self.parse_array_initializer()
        } else {
            self.parse_expression()
        }
    }

    fn parse_assignment_expression(&mut self) -> NodeIndex {
        if self.is_lambda_start() {
            return self.parse_lambda();
        }
        if !self.enter_nested() {
            return NodeIndex::NONE;
        }
        let pos = self.token_pos();
        let left = self.parse_conditional_expression();
        let result = match self.assignment_operator() {
            Some((operator, token_count)) if left.is_some() => {
                self.current += token_count;
                let right = self.parse_assignment_expression();
                self.finish_node(
                    NodeKind::Assignment,
                    pos,
                    NodeData::Binary(BinaryData { left, operator, right }),
                )
            }
            _ => left,
        };
        self.exit_nested();
        result
    }

    fn assignment_operator(&self) -> Option<(&'static str, usize)> {
        let kind = self.kind();
        if kind.is_assignment_operator() {
            return Some((kind.text(), 1));
        }
        if kind == SyntaxKind::GreaterThanToken {
            let (operator, count) = self.greater_than_operator();
            if operator.ends_with('=') {
                return Some((operator, count));
            }
        }
        None
    }

    /// Adjacent `>` tokens at the cursor joined into one operator, with the
    /// number of tokens it spans.
    fn greater_than_operator(&self) -> (&'static str, usize) {
        let mut count = 1;
        let mut end = self.token().end;
        while count < 3 {
            let next = self.token_at(self.current + count);
            if next.pos != end {
                break;
            }
            match next.kind {
                SyntaxKind::GreaterThanToken => {
                    count += 1;
                    end = next.end;
                }
                SyntaxKind::GreaterThanEqualsToken => {
                    let operator = if count == 1 { ">>=" } else { ">>>=" };
                    return (operator, count + 1);
                }
                _ => break,
            }
        }
        let operator = match count {
            1 => ">",
            2 => ">>",
            _ => ">>>",
        };
        (operator, count)
    }

    pub(crate) fn parse_conditional_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let condition = self.parse_binary_expression(0);
        if condition.is_none() || !self.parse_optional(SyntaxKind::QuestionToken) {
            return condition;
        }
        let when_true = self.parse_assignment_expression();
        self.parse_expected(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression();
        self.finish_node(
            NodeKind::Conditional,
            pos,
            NodeData::Conditional(ConditionalData {
                condition,
                when_true,
                when_false,
            }),
        )
    }

    fn binary_operator(&self) -> Option<(&'static str, u8, usize)> {
        let kind = self.kind();
        let precedence = match kind {
            SyntaxKind::BarBarToken => 1,
            SyntaxKind::AmpersandAmpersandToken => 2,
            SyntaxKind::BarToken => 3,
            SyntaxKind::CaretToken => 4,
            SyntaxKind::AmpersandToken => 5,
            SyntaxKind::EqualsEqualsToken | SyntaxKind::ExclamationEqualsToken => 6,
            SyntaxKind::LessThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::InstanceOfKeyword => RELATIONAL_PRECEDENCE,
            SyntaxKind::GreaterThanToken => {
                let (operator, count) = self.greater_than_operator();
                return match count {
                    _ if operator.ends_with('=') => None,
                    1 => Some((operator, RELATIONAL_PRECEDENCE, 1)),
                    _ => Some((operator, 8, count)),
                };
            }
            SyntaxKind::LessThanLessThanToken => 8,
            SyntaxKind::PlusToken | SyntaxKind::MinusToken => 9,
            SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 10,
            _ => return None,
        };
        Some((kind.text(), precedence, 1))
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let pos = self.token_pos();
        let mut left = self.parse_unary_expression();
        if left.is_none() {
            return left;
        }
        while let Some((operator, precedence, token_count)) = self.binary_operator() {
            if precedence <= min_precedence {
                break;
            }
            self.current += token_count;

            if operator == "instanceof" {
                self.parse_modifiers(false);
                let type_ref = self.parse_type_reference(false);
                if self.is(SyntaxKind::Identifier) {
                    let binding = self.token();
                    self.error_unsupported(binding.pos, binding.end, "Pattern matching in instanceof");
                    self.next_token();
                }
                left = self.finish_node(
                    NodeKind::InstanceOf,
                    pos,
                    NodeData::InstanceOf(InstanceOfData {
                        expression: left,
                        type_ref,
                    }),
                );
                continue;
            }

            let right = self.parse_binary_expression(precedence);
            left = self.finish_node(
                NodeKind::Binary,
                pos,
                NodeData::Binary(BinaryData { left, operator, right }),
            );
        }
        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        if !self.enter_nested() {
            return NodeIndex::NONE;
        }
        let pos = self.token_pos();
        let result = match self.kind() {
            SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken => {
                let operator = self.kind().text();
                self.next_token();
                let operand = self.parse_unary_expression();
                self.finish_node(
                    NodeKind::Unary,
                    pos,
                    NodeData::Unary(UnaryData {
                        operator,
                        operand,
                        is_prefix: true,
                    }),
                )
            }
            SyntaxKind::OpenParenToken if self.is_cast() => self.parse_cast(),
            _ => self.parse_postfix_expression(),
        };
        self.exit_nested();
        result
    }

    // =========================================================================
    // Casts and lambdas
    // =========================================================================

    fn is_cast(&self) -> bool {
        let first = self.current + 1;
        let Some(mut end) = self.scan_type(first) else {
            return false;
        };
        while self.kind_at(end) == SyntaxKind::AmpersandToken {
            match self.scan_type(end + 1) {
                Some(next) => end = next,
                None => return false,
            }
        }
        if self.kind_at(end) != SyntaxKind::CloseParenToken {
            return false;
        }
        if self.kind_at(first).is_primitive_type() {
            return true;
        }
        let next = self.kind_at(end + 1);
        next.is_literal()
            || matches!(
                next,
                SyntaxKind::Identifier
                    | SyntaxKind::OpenParenToken
                    | SyntaxKind::ExclamationToken
                    | SyntaxKind::TildeToken
                    | SyntaxKind::ThisKeyword
                    | SyntaxKind::SuperKeyword
                    | SyntaxKind::NewKeyword
                    | SyntaxKind::SwitchKeyword
            )
    }

    fn parse_cast(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let type_ref = self.parse_type_reference(true);
        self.parse_expected(SyntaxKind::CloseParenToken);
        let expression = if self.is_lambda_start() {
            self.parse_lambda()
        } else {
            self.parse_unary_expression()
        };
        self.finish_node(
            NodeKind::Cast,
            pos,
            NodeData::Cast(CastData { type_ref, expression }),
        )
    }

    fn is_lambda_start(&self) -> bool {
        match self.kind() {
            SyntaxKind::Identifier => self.peek_kind(1) == SyntaxKind::ArrowToken,
            SyntaxKind::OpenParenToken => self
                .scan_balanced(self.current, SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken)
                .is_some_and(|end| self.kind_at(end) == SyntaxKind::ArrowToken),
            _ => false,
        }
    }

    fn parse_lambda(&mut self) -> NodeIndex {
        if !self.enter_nested() {
            return NodeIndex::NONE;
        }
        let pos = self.token_pos();
        let mut parameters = Vec::new();

        if self.is(SyntaxKind::Identifier) {
            parameters.push(self.parse_implicit_lambda_parameter());
        } else {
            self.next_token();
            while !matches!(
                self.kind(),
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
            ) {
                let start = self.current;
                let is_implicit = self.is(SyntaxKind::Identifier)
                    && matches!(
                        self.peek_kind(1),
                        SyntaxKind::CommaToken | SyntaxKind::CloseParenToken
                    );
                let parameter = if is_implicit {
                    self.parse_implicit_lambda_parameter()
                } else {
                    self.parse_parameter(NodeKind::Parameter)
                };
                if parameter.is_some() {
                    parameters.push(parameter);
                }
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    if self.current == start {
                        self.next_token();
                    }
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
        }

        self.parse_expected(SyntaxKind::ArrowToken);
        let body = if self.is(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_expression()
        };
        self.exit_nested();
        self.finish_node(
            NodeKind::Lambda,
            pos,
            NodeData::Lambda(LambdaData {
                parameters: parameters.into(),
                body,
            }),
        )
    }

    fn parse_implicit_lambda_parameter(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let name = self.parse_identifier();
        self.finish_node(
            NodeKind::Parameter,
            pos,
            NodeData::Parameter(ParameterData {
                modifiers: ModifierFlags::empty(),
                type_ref: NodeIndex::NONE,
                name,
                is_varargs: false,
            }),
        )
    }

    // =========================================================================
    // Postfix selectors
    // =========================================================================

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut expression = self.parse_primary_expression();
        if expression.is_none() {
            return expression;
        }
        loop {
            expression = match self.kind() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    self.parse_member_selector(pos, expression)
                }
                SyntaxKind::OpenBracketToken if self.peek_kind(1) == SyntaxKind::CloseBracketToken => {
                    // `Name[]` followed by `.class` or `::new`
                    self.skip_dimensions();
                    self.convert_to_type_reference(expression);
                    if self.is(SyntaxKind::DotToken) && self.peek_kind(1) == SyntaxKind::ClassKeyword {
                        self.next_token();
                        self.next_token();
                        self.finish_node(
                            NodeKind::ClassLiteral,
                            pos,
                            NodeData::ClassLiteral(ClassLiteralData { type_ref: expression }),
                        )
                    } else {
                        expression
                    }
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let index = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    self.finish_node(
                        NodeKind::ArrayAccess,
                        pos,
                        NodeData::ArrayAccess(ArrayAccessData { expression, index }),
                    )
                }
                SyntaxKind::ColonColonToken => {
                    self.next_token();
                    self.skip_type_parameters();
                    let name = if self.parse_optional(SyntaxKind::NewKeyword) {
                        "new".to_string()
                    } else {
                        let name = self.token_text().to_string();
                        self.parse_expected(SyntaxKind::Identifier);
                        name
                    };
                    self.finish_node(
                        NodeKind::MethodReference,
                        pos,
                        NodeData::MethodReference(MethodReferenceData { expression, name }),
                    )
                }
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                    let operator = self.kind().text();
                    self.next_token();
                    self.finish_node(
                        NodeKind::Unary,
                        pos,
                        NodeData::Unary(UnaryData {
                            operator,
                            operand: expression,
                            is_prefix: false,
                        }),
                    )
                }
                _ => break,
            };
        }
        expression
    }

    /// Everything that can follow `expr.`
    fn parse_member_selector(&mut self, pos: u32, expression: NodeIndex) -> NodeIndex {
        match self.kind() {
            SyntaxKind::Identifier | SyntaxKind::LessThanToken => {
                self.skip_type_parameters();
                let name = self.token_text().to_string();
                if !self.parse_expected(SyntaxKind::Identifier) {
                    return expression;
                }
                if self.is(SyntaxKind::OpenParenToken) {
                    let arguments = self.parse_arguments();
                    self.finish_node(
                        NodeKind::MethodCall,
                        pos,
                        NodeData::MethodCall(MethodCallData {
                            expression,
                            name,
                            arguments,
                        }),
                    )
                } else {
                    self.finish_node(
                        NodeKind::FieldAccess,
                        pos,
                        NodeData::FieldAccess(FieldAccessData { expression, name }),
                    )
                }
            }
            SyntaxKind::NewKeyword => self.parse_creation_expression(pos, expression),
            SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword => {
                let kind = if self.is(SyntaxKind::ThisKeyword) {
                    NodeKind::ThisExpression
                } else {
                    NodeKind::SuperExpression
                };
                let qualifier = self.node_text(expression);
                self.convert_to_type_reference(expression);
                self.next_token();
                self.finish_node(
                    kind,
                    pos,
                    NodeData::This(ThisData {
                        qualifier: Some(qualifier),
                    }),
                )
            }
            SyntaxKind::ClassKeyword => {
                self.next_token();
                self.convert_to_type_reference(expression);
                self.finish_node(
                    NodeKind::ClassLiteral,
                    pos,
                    NodeData::ClassLiteral(ClassLiteralData { type_ref: expression }),
                )
            }
            _ => {
                self.error_unexpected();
                expression
            }
        }
    }

    /// Source text of a node, whitespace normalised.
    fn node_text(&self, idx: NodeIndex) -> String {
        self.arena
            .get(idx)
            .and_then(|node| self.source.get(node.pos as usize..node.end as usize))
            .map(|text| text.split_whitespace().collect::<String>())
            .unwrap_or_default()
    }

    /// Reinterpret an already-parsed name chain as a type (`Outer.this`,
    /// `a.b.C.class`, `String[]::new`).
    fn convert_to_type_reference(&mut self, idx: NodeIndex) {
        let text = self.node_text(idx);
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        let text = if node.end < self.prev_end() {
            // Include dimensions consumed after the node.
            self.source
                .get(node.pos as usize..self.prev_end() as usize)
                .map(|t| t.split_whitespace().collect::<String>())
                .unwrap_or(text)
        } else {
            text
        };
        self.arena.replace_node(
            idx,
            NodeKind::TypeReference,
            NodeData::TypeReference(TypeReferenceData { text }),
        );
    }

    // =========================================================================
    // Primaries
    // =========================================================================

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let kind = self.kind();
        match kind {
            _ if kind.is_literal() => {
                let text = self.token_text().to_string();
                self.next_token();
                self.finish_node(NodeKind::Literal, pos, NodeData::Literal(LiteralData { text }))
            }
            SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword => {
                self.next_token();
                if self.is(SyntaxKind::OpenParenToken) {
                    // Explicit constructor invocation
                    let arguments = self.parse_arguments();
                    return self.finish_node(
                        NodeKind::MethodCall,
                        pos,
                        NodeData::MethodCall(MethodCallData {
                            expression: NodeIndex::NONE,
                            name: kind.text().to_string(),
                            arguments,
                        }),
                    );
                }
                let node_kind = if kind == SyntaxKind::ThisKeyword {
                    NodeKind::ThisExpression
                } else {
                    NodeKind::SuperExpression
                };
                self.finish_node(node_kind, pos, NodeData::This(ThisData::default()))
            }
            SyntaxKind::Identifier => {
                let name = self.token_text().to_string();
                self.next_token();
                if self.is(SyntaxKind::OpenParenToken) {
                    let arguments = self.parse_arguments();
                    self.finish_node(
                        NodeKind::MethodCall,
                        pos,
                        NodeData::MethodCall(MethodCallData {
                            expression: NodeIndex::NONE,
                            name,
                            arguments,
                        }),
                    )
                } else {
                    self.finish_node(NodeKind::NameExpression, pos, NodeData::Name(NameData { name }))
                }
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.finish_node(
                    NodeKind::Parenthesized,
                    pos,
                    NodeData::Expr(ExprData { expression }),
                )
            }
            SyntaxKind::NewKeyword => self.parse_creation_expression(pos, NodeIndex::NONE),
            SyntaxKind::SwitchKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                let body = self.parse_switch_body();
                self.finish_node(
                    NodeKind::SwitchExpression,
                    pos,
                    NodeData::Switch(SwitchData { expression, body }),
                )
            }
            _ if kind.is_primitive_type() => {
                let type_ref = self.parse_type_reference(false);
                if self.is(SyntaxKind::DotToken) && self.peek_kind(1) == SyntaxKind::ClassKeyword {
                    self.next_token();
                    self.next_token();
                    self.finish_node(
                        NodeKind::ClassLiteral,
                        pos,
                        NodeData::ClassLiteral(ClassLiteralData { type_ref }),
                    )
                } else {
                    if !self.is(SyntaxKind::ColonColonToken) {
                        self.parse_expected(SyntaxKind::DotToken);
                    }
                    type_ref
                }
            }
            _ => {
                self.error_unexpected();
                NodeIndex::NONE
            }
        }
    }

    /// `new T(args) [body]`, `new T[n]...`, `new T[]{...}`; `outer` is the
    /// instance in `outer.new Inner()`.
    fn parse_creation_expression(&mut self, pos: u32, outer: NodeIndex) -> NodeIndex {
        self.next_token();
        self.skip_type_parameters();
        let type_ref = self.parse_type_reference(false);
        if type_ref.is_none() {
            return NodeIndex::NONE;
        }

        if self.is(SyntaxKind::OpenBracketToken) || self.is(SyntaxKind::OpenBraceToken) {
            let mut dimensions = Vec::new();
            while self.is(SyntaxKind::OpenBracketToken) && self.peek_kind(1) != SyntaxKind::CloseBracketToken {
                self.next_token();
                let dimension = self.parse_expression();
                if dimension.is_some() {
                    dimensions.push(dimension);
                }
                self.parse_expected(SyntaxKind::CloseBracketToken);
            }
            self.skip_dimensions();
            let initializer = if self.is(SyntaxKind::OpenBraceToken) {
                self.parse_array_initializer()
            } else {
                NodeIndex::NONE
            };
            return self.finish_node(
                NodeKind::ArrayCreation,
                pos,
                NodeData::ArrayCreation(ArrayCreationData {
                    type_ref,
                    dimensions: dimensions.into(),
                    initializer,
                }),
            );
        }

        let arguments = self.parse_arguments();
        let body = self
            .is(SyntaxKind::OpenBraceToken)
            .then(|| self.parse_anonymous_class_body());
        self.finish_node(
            NodeKind::ObjectCreation,
            pos,
            NodeData::ObjectCreation(ObjectCreationData {
                outer,
                type_ref,
                arguments,
                body,
            }),
        )
    }

    pub(crate) fn parse_arguments(&mut self) -> NodeList {
        let mut arguments = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::new();
        }
        while !matches!(
            self.kind(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let argument = self.parse_expression();
            if argument.is_some() {
                arguments.push(argument);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        arguments.into()
    }

    fn parse_array_initializer(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) && !self.is_aborted()
        {
            let element = self.parse_variable_initializer();
            if element.is_some() {
                elements.push(element);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(
            NodeKind::ArrayInitializer,
            pos,
            NodeData::ArrayInitializer(ArrayInitializerData {
                elements: elements.into(),
            }),
        )
    }
}

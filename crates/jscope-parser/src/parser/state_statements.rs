//! Parser state - statements and blocks.

use super::base::{NodeIndex, NodeList};
use super::flags::ModifierFlags;
use super::node::{
    AssertData, BlockData, CaseClauseData, CatchClauseData, ExprData, ForData, ForEachData, IfData,
    JumpData, LabeledData, LoopData, NodeData, NodeKind, ParameterData, ResourceData,
    ResourceListData, SwitchBodyData, SwitchData, SynchronizedData, TryData, VariableData,
};
use super::state::ParserState;
use jscope_scanner::SyntaxKind;

impl ParserState {
    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return NodeIndex::NONE;
        }
        if !self.enter_nested() {
            return NodeIndex::NONE;
        }
        let statements = self.parse_statement_list(false);
        self.exit_nested();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(
            NodeKind::Block,
            pos,
            NodeData::Block(BlockData {
                statements: statements.into(),
            }),
        )
    }

    /// Block statements up to `}`; inside a switch group also up to the next
    /// `case` or `default` label.
    fn parse_statement_list(&mut self, in_switch_group: bool) -> Vec<NodeIndex> {
        let mut statements = Vec::new();
        loop {
            match self.kind() {
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword if in_switch_group => break,
                _ if self.is_aborted() => break,
                _ => {}
            }
            let start = self.current;
            let statement = self.parse_block_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.current == start {
                self.error_unexpected();
                self.next_token();
            }
        }
        statements
    }

    /// A statement, local variable declaration or local type declaration.
    pub(crate) fn parse_block_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let has_modifiers = match self.kind() {
            SyntaxKind::FinalKeyword
            | SyntaxKind::AbstractKeyword
            | SyntaxKind::StrictFpKeyword => true,
            SyntaxKind::StaticKeyword => self.peek_kind(1) != SyntaxKind::OpenBraceToken,
            SyntaxKind::AtToken => self.peek_kind(1) != SyntaxKind::InterfaceKeyword,
            _ => false,
        };
        if has_modifiers {
            let modifiers = self.parse_modifiers(false);
            if self.is_type_declaration_start() {
                return self.parse_type_declaration(pos, modifiers);
            }
            let declaration = self.parse_local_variable_declaration(pos, modifiers);
            self.parse_expected(SyntaxKind::SemicolonToken);
            return declaration;
        }
        if self.is_type_declaration_start() {
            return self.parse_type_declaration(pos, ModifierFlags::empty());
        }
        if !self.is_yield_statement_start() && self.is_local_variable_declaration_start() {
            let declaration = self.parse_local_variable_declaration(pos, ModifierFlags::empty());
            self.parse_expected(SyntaxKind::SemicolonToken);
            return declaration;
        }
        self.parse_statement()
    }

    /// `Type name [= init], ...` without the trailing `;`.
    fn parse_local_variable_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> NodeIndex {
        let type_ref = self.parse_type_reference(false);
        if type_ref.is_none() {
            return NodeIndex::NONE;
        }
        let declarators = self.parse_variable_declarators();
        self.finish_node(
            NodeKind::LocalVariableStatement,
            pos,
            NodeData::Variable(VariableData {
                modifiers,
                type_ref,
                declarators,
            }),
        )
    }

    /// `yield` is a statement keyword unless the identifier is being used
    /// as an ordinary name.
    fn is_yield_statement_start(&self) -> bool {
        self.is_contextual("yield")
            && !self.peek_kind(1).is_assignment_operator()
            && !matches!(
                self.peek_kind(1),
                SyntaxKind::DotToken
                    | SyntaxKind::OpenParenToken
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::PlusPlusToken
                    | SyntaxKind::MinusMinusToken
                    | SyntaxKind::ArrowToken
                    | SyntaxKind::ColonToken
                    | SyntaxKind::ColonColonToken
                    | SyntaxKind::SemicolonToken
            )
    }

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_nested() {
            return NodeIndex::NONE;
        }
        let statement = self.parse_statement_worker();
        self.exit_nested();
        statement
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.kind() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                self.next_token();
                self.finish_node(NodeKind::EmptyStatement, pos, NodeData::None)
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => {
                self.next_token();
                let condition = self.parse_parenthesized_condition();
                let statement = self.parse_statement();
                self.finish_node(
                    NodeKind::WhileStatement,
                    pos,
                    NodeData::Loop(LoopData { condition, statement }),
                )
            }
            SyntaxKind::DoKeyword => {
                self.next_token();
                let statement = self.parse_statement();
                self.parse_expected(SyntaxKind::WhileKeyword);
                let condition = self.parse_parenthesized_condition();
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.finish_node(
                    NodeKind::DoStatement,
                    pos,
                    NodeData::Loop(LoopData { condition, statement }),
                )
            }
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::SwitchKeyword => {
                self.next_token();
                let expression = self.parse_parenthesized_condition();
                let body = self.parse_switch_body();
                self.finish_node(
                    NodeKind::SwitchStatement,
                    pos,
                    NodeData::Switch(SwitchData { expression, body }),
                )
            }
            SyntaxKind::ReturnKeyword => self.parse_expression_keyword_statement(NodeKind::ReturnStatement, true),
            SyntaxKind::ThrowKeyword => self.parse_expression_keyword_statement(NodeKind::ThrowStatement, false),
            SyntaxKind::BreakKeyword => self.parse_jump_statement(NodeKind::BreakStatement),
            SyntaxKind::ContinueKeyword => self.parse_jump_statement(NodeKind::ContinueStatement),
            SyntaxKind::AssertKeyword => {
                self.next_token();
                let condition = self.parse_expression();
                let message = if self.parse_optional(SyntaxKind::ColonToken) {
                    self.parse_expression()
                } else {
                    NodeIndex::NONE
                };
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.finish_node(
                    NodeKind::AssertStatement,
                    pos,
                    NodeData::Assert(AssertData { condition, message }),
                )
            }
            SyntaxKind::SynchronizedKeyword => {
                self.next_token();
                let expression = self.parse_parenthesized_condition();
                let block = self.parse_block();
                self.finish_node(
                    NodeKind::SynchronizedStatement,
                    pos,
                    NodeData::Synchronized(SynchronizedData { expression, block }),
                )
            }
            SyntaxKind::Identifier if self.is_yield_statement_start() => {
                self.parse_expression_keyword_statement(NodeKind::YieldStatement, false)
            }
            SyntaxKind::Identifier if self.peek_kind(1) == SyntaxKind::ColonToken => {
                let label = self.token_text().to_string();
                self.next_token();
                self.next_token();
                let statement = self.parse_statement();
                self.finish_node(
                    NodeKind::LabeledStatement,
                    pos,
                    NodeData::Labeled(LabeledData { label, statement }),
                )
            }
            _ => {
                let expression = self.parse_expression();
                if expression.is_none() {
                    return NodeIndex::NONE;
                }
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.expression_statement(pos, expression)
            }
        }
    }

    fn expression_statement(&mut self, pos: u32, expression: NodeIndex) -> NodeIndex {
        self.finish_node(
            NodeKind::ExpressionStatement,
            pos,
            NodeData::Expr(ExprData { expression }),
        )
    }

    fn parse_parenthesized_condition(&mut self) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        expression
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            NodeKind::IfStatement,
            pos,
            NodeData::If(IfData {
                expression,
                then_statement,
                else_statement,
            }),
        )
    }

    /// `return [expr];`, `throw expr;`, `yield expr;`
    fn parse_expression_keyword_statement(&mut self, kind: NodeKind, optional: bool) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = if optional && self.is(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.finish_node(kind, pos, NodeData::Expr(ExprData { expression }))
    }

    fn parse_jump_statement(&mut self, kind: NodeKind) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let label = if self.is(SyntaxKind::Identifier) {
            let label = self.token_text().to_string();
            self.next_token();
            Some(label)
        } else {
            None
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.finish_node(kind, pos, NodeData::Jump(JumpData { label }))
    }

    // =========================================================================
    // for / for-each
    // =========================================================================

    fn parse_for_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        let init_pos = self.token_pos();
        let checkpoint = self.current;
        let modifiers = self.parse_modifiers(false);
        let is_for_each = self.scan_type(self.current).is_some_and(|end| {
            self.kind_at(end) == SyntaxKind::Identifier && self.kind_at(end + 1) == SyntaxKind::ColonToken
        });

        if is_for_each {
            let type_ref = self.parse_type_reference(false);
            let name = self.parse_identifier();
            let variable = self.finish_node(
                NodeKind::Parameter,
                init_pos,
                NodeData::Parameter(ParameterData {
                    modifiers,
                    type_ref,
                    name,
                    is_varargs: false,
                }),
            );
            self.parse_expected(SyntaxKind::ColonToken);
            let expression = self.parse_expression();
            self.parse_expected(SyntaxKind::CloseParenToken);
            let statement = self.parse_statement();
            return self.finish_node(
                NodeKind::ForEachStatement,
                pos,
                NodeData::ForEach(ForEachData {
                    variable,
                    expression,
                    statement,
                }),
            );
        }

        let initializer = if self.current != checkpoint || self.is_local_variable_declaration_start() {
            let declaration = self.parse_local_variable_declaration(init_pos, modifiers);
            NodeList::from(vec![declaration])
        } else {
            self.parse_expression_statement_list(SyntaxKind::SemicolonToken)
        };
        self.parse_expected(SyntaxKind::SemicolonToken);

        let condition = if self.is(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);

        let update = self.parse_expression_statement_list(SyntaxKind::CloseParenToken);
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();

        self.finish_node(
            NodeKind::ForStatement,
            pos,
            NodeData::For(ForData {
                initializer,
                condition,
                update,
                statement,
            }),
        )
    }

    /// Comma-separated expressions wrapped as expression statements.
    fn parse_expression_statement_list(&mut self, terminator: SyntaxKind) -> NodeList {
        let mut statements = Vec::new();
        if self.is(terminator) {
            return NodeList::new();
        }
        loop {
            let pos = self.token_pos();
            let expression = self.parse_expression();
            if expression.is_some() {
                statements.push(self.expression_statement(pos, expression));
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        statements.into()
    }

    // =========================================================================
    // try / catch / finally
    // =========================================================================

    fn parse_try_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        let resources = if self.is(SyntaxKind::OpenParenToken) {
            self.parse_resource_list()
        } else {
            NodeIndex::NONE
        };
        let try_block = self.parse_block();

        let mut catch_clauses = Vec::new();
        while self.is(SyntaxKind::CatchKeyword) {
            let catch_pos = self.token_pos();
            self.next_token();
            self.parse_expected(SyntaxKind::OpenParenToken);
            let parameter = self.parse_parameter(NodeKind::Parameter);
            self.parse_expected(SyntaxKind::CloseParenToken);
            let block = self.parse_block();
            catch_clauses.push(self.finish_node(
                NodeKind::CatchClause,
                catch_pos,
                NodeData::CatchClause(CatchClauseData { parameter, block }),
            ));
        }

        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };

        if resources.is_none() && catch_clauses.is_empty() && finally_block.is_none() {
            self.parse_expected(SyntaxKind::CatchKeyword);
        }

        self.finish_node(
            NodeKind::TryStatement,
            pos,
            NodeData::Try(TryData {
                resources,
                try_block,
                catch_clauses: catch_clauses.into(),
                finally_block,
            }),
        )
    }

    /// `( resource {; resource} [;] )`
    fn parse_resource_list(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut resources = Vec::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) && !self.is_aborted()
        {
            let start = self.current;
            let resource = self.parse_resource();
            if resource.is_some() {
                resources.push(resource);
            }
            if !self.parse_optional(SyntaxKind::SemicolonToken) {
                if self.current == start {
                    self.error_unexpected();
                    self.next_token();
                }
                break;
            }
        }
        if resources.is_empty() {
            self.parse_expected(SyntaxKind::Identifier);
            self.parse_optional(SyntaxKind::CloseParenToken);
            return NodeIndex::NONE;
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.finish_node(
            NodeKind::ResourceList,
            pos,
            NodeData::ResourceList(ResourceListData {
                resources: resources.into(),
            }),
        )
    }

    fn parse_resource(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let checkpoint = self.current;
        let modifiers = self.parse_modifiers(false);

        let data = if self.current != checkpoint || self.is_local_variable_declaration_start() {
            let type_ref = self.parse_type_reference(false);
            let name = self.parse_identifier();
            self.parse_expected(SyntaxKind::EqualsToken);
            let initializer = self.parse_expression();
            ResourceData {
                modifiers,
                type_ref,
                name,
                initializer,
            }
        } else {
            let initializer = self.parse_expression();
            if initializer.is_none() {
                return NodeIndex::NONE;
            }
            ResourceData {
                modifiers,
                type_ref: NodeIndex::NONE,
                name: NodeIndex::NONE,
                initializer,
            }
        };
        self.finish_node(NodeKind::Resource, pos, NodeData::Resource(data))
    }

    // =========================================================================
    // switch
    // =========================================================================

    /// `{ clause* }` shared by switch statements and switch expressions.
    ///
    /// Always produces a `SwitchBody` node, empty when the brace is missing.
    pub(crate) fn parse_switch_body(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return self.finish_node(
                NodeKind::SwitchBody,
                pos,
                NodeData::SwitchBody(SwitchBodyData::default()),
            );
        }
        let mut clauses = Vec::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) && !self.is_aborted()
        {
            if matches!(self.kind(), SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword) {
                clauses.push(self.parse_case_clause());
            } else {
                self.error_unexpected();
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(
            NodeKind::SwitchBody,
            pos,
            NodeData::SwitchBody(SwitchBodyData {
                clauses: clauses.into(),
            }),
        )
    }

    fn parse_case_clause(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut labels = Vec::new();
        let mut is_default = false;

        if self.parse_optional(SyntaxKind::DefaultKeyword) {
            is_default = true;
        } else {
            self.next_token();
            loop {
                if self.parse_optional(SyntaxKind::DefaultKeyword) {
                    is_default = true;
                } else {
                    let label = self.parse_conditional_expression();
                    if label.is_some() {
                        labels.push(label);
                    }
                    if self.is(SyntaxKind::Identifier) {
                        let ident = self.token();
                        self.error_unsupported(ident.pos, ident.end, "Type patterns in case labels");
                        self.next_token();
                    }
                }
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }

        let mut statements = Vec::new();
        let is_arrow = self.parse_optional(SyntaxKind::ArrowToken);
        if is_arrow {
            let body_pos = self.token_pos();
            let body = match self.kind() {
                SyntaxKind::OpenBraceToken => self.parse_block(),
                SyntaxKind::ThrowKeyword => self.parse_statement(),
                _ => {
                    let expression = self.parse_expression();
                    self.parse_expected(SyntaxKind::SemicolonToken);
                    if expression.is_some() {
                        self.expression_statement(body_pos, expression)
                    } else {
                        NodeIndex::NONE
                    }
                }
            };
            if body.is_some() {
                statements.push(body);
            }
        } else {
            self.parse_expected(SyntaxKind::ColonToken);
            statements = self.parse_statement_list(true);
        }

        self.finish_node(
            NodeKind::CaseClause,
            pos,
            NodeData::CaseClause(CaseClauseData {
                labels: labels.into(),
                is_default,
                is_arrow,
                statements: statements.into(),
            }),
        )
    }
}

//! Typed node accessors and child enumeration.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use smallvec::SmallVec;

/// Children of one node in source order.
pub type ChildList = SmallVec<[NodeIndex; 8]>;

macro_rules! typed_accessor {
    ($fn_name:ident, $variant:ident, $data:ty) => {
        #[inline]
        pub fn $fn_name<'a>(&'a self, node: &'a Node) -> Option<&'a $data> {
            match &node.data {
                NodeData::$variant(data) => Some(data),
                _ => None,
            }
        }
    };
}

impl NodeArena {
    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn kind(&self, idx: NodeIndex) -> Option<NodeKind> {
        self.get(idx).map(|n| n.kind)
    }

    #[inline]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map(|n| n.parent).unwrap_or(NodeIndex::NONE)
    }

    typed_accessor!(get_compilation_unit, CompilationUnit, CompilationUnitData);
    typed_accessor!(get_type_decl, TypeDecl, TypeDeclData);
    typed_accessor!(get_enum_constant, EnumConstant, EnumConstantData);
    typed_accessor!(get_variable, Variable, VariableData);
    typed_accessor!(get_variable_declarator, VariableDeclarator, VariableDeclaratorData);
    typed_accessor!(get_method, Method, MethodData);
    typed_accessor!(get_initializer, Initializer, InitializerData);
    typed_accessor!(get_parameter, Parameter, ParameterData);
    typed_accessor!(get_block, Block, BlockData);
    typed_accessor!(get_expr, Expr, ExprData);
    typed_accessor!(get_if_statement, If, IfData);
    typed_accessor!(get_loop, Loop, LoopData);
    typed_accessor!(get_for, For, ForData);
    typed_accessor!(get_for_each, ForEach, ForEachData);
    typed_accessor!(get_try, Try, TryData);
    typed_accessor!(get_resource_list, ResourceList, ResourceListData);
    typed_accessor!(get_resource, Resource, ResourceData);
    typed_accessor!(get_catch_clause, CatchClause, CatchClauseData);
    typed_accessor!(get_switch, Switch, SwitchData);
    typed_accessor!(get_switch_body, SwitchBody, SwitchBodyData);
    typed_accessor!(get_case_clause, CaseClause, CaseClauseData);
    typed_accessor!(get_assert, Assert, AssertData);
    typed_accessor!(get_jump, Jump, JumpData);
    typed_accessor!(get_labeled_statement, Labeled, LabeledData);
    typed_accessor!(get_synchronized, Synchronized, SynchronizedData);
    typed_accessor!(get_name, Name, NameData);
    typed_accessor!(get_literal, Literal, LiteralData);
    typed_accessor!(get_this, This, ThisData);
    typed_accessor!(get_field_access, FieldAccess, FieldAccessData);
    typed_accessor!(get_method_call, MethodCall, MethodCallData);
    typed_accessor!(get_array_access, ArrayAccess, ArrayAccessData);
    typed_accessor!(get_object_creation, ObjectCreation, ObjectCreationData);
    typed_accessor!(get_array_creation, ArrayCreation, ArrayCreationData);
    typed_accessor!(get_array_initializer, ArrayInitializer, ArrayInitializerData);
    typed_accessor!(get_binary, Binary, BinaryData);
    typed_accessor!(get_unary, Unary, UnaryData);
    typed_accessor!(get_conditional, Conditional, ConditionalData);
    typed_accessor!(get_cast, Cast, CastData);
    typed_accessor!(get_instance_of, InstanceOf, InstanceOfData);
    typed_accessor!(get_lambda, Lambda, LambdaData);
    typed_accessor!(get_method_reference, MethodReference, MethodReferenceData);
    typed_accessor!(get_class_literal, ClassLiteral, ClassLiteralData);
    typed_accessor!(get_type_reference, TypeReference, TypeReferenceData);

    /// Text of an `Identifier` or `NameExpression` node.
    pub fn get_identifier_name(&self, idx: NodeIndex) -> Option<&str> {
        let node = self.get(idx)?;
        match node.kind {
            NodeKind::Identifier | NodeKind::NameExpression => {
                self.get_name(node).map(|n| n.name.as_str())
            }
            _ => None,
        }
    }

    /// Children of `idx` in source order.
    pub fn children(&self, idx: NodeIndex) -> ChildList {
        let mut out = ChildList::new();
        let Some(node) = self.get(idx) else {
            return out;
        };

        fn push(out: &mut ChildList, idx: NodeIndex) {
            if idx.is_some() {
                out.push(idx);
            }
        }
        fn push_list(out: &mut ChildList, list: &NodeList) {
            out.extend(list.iter().filter(|idx| idx.is_some()));
        }

        match &node.data {
            NodeData::None
            | NodeData::Jump(_)
            | NodeData::Name(_)
            | NodeData::Literal(_)
            | NodeData::This(_)
            | NodeData::TypeReference(_) => {}
            NodeData::CompilationUnit(d) => push_list(&mut out, &d.types),
            NodeData::TypeDecl(d) => {
                push(&mut out, d.name);
                push_list(&mut out, &d.components);
                push_list(&mut out, &d.enum_constants);
                push_list(&mut out, &d.members);
            }
            NodeData::EnumConstant(d) => {
                push(&mut out, d.name);
                push_list(&mut out, &d.arguments);
                if let Some(body) = &d.body {
                    push_list(&mut out, body);
                }
            }
            NodeData::Variable(d) => {
                push(&mut out, d.type_ref);
                push_list(&mut out, &d.declarators);
            }
            NodeData::VariableDeclarator(d) => {
                push(&mut out, d.name);
                push(&mut out, d.initializer);
            }
            NodeData::Method(d) => {
                push(&mut out, d.return_type);
                push(&mut out, d.name);
                push_list(&mut out, &d.parameters);
                push(&mut out, d.body);
                push(&mut out, d.default_value);
            }
            NodeData::Initializer(d) => push(&mut out, d.body),
            NodeData::Parameter(d) => {
                push(&mut out, d.type_ref);
                push(&mut out, d.name);
            }
            NodeData::Block(d) => push_list(&mut out, &d.statements),
            NodeData::Expr(d) => push(&mut out, d.expression),
            NodeData::If(d) => {
                push(&mut out, d.expression);
                push(&mut out, d.then_statement);
                push(&mut out, d.else_statement);
            }
            NodeData::Loop(d) => {
                if node.kind == NodeKind::DoStatement {
                    push(&mut out, d.statement);
                    push(&mut out, d.condition);
                } else {
                    push(&mut out, d.condition);
                    push(&mut out, d.statement);
                }
            }
            NodeData::For(d) => {
                push_list(&mut out, &d.initializer);
                push(&mut out, d.condition);
                push_list(&mut out, &d.update);
                push(&mut out, d.statement);
            }
            NodeData::ForEach(d) => {
                push(&mut out, d.variable);
                push(&mut out, d.expression);
                push(&mut out, d.statement);
            }
            NodeData::Try(d) => {
                push(&mut out, d.resources);
                push(&mut out, d.try_block);
                push_list(&mut out, &d.catch_clauses);
                push(&mut out, d.finally_block);
            }
            NodeData::ResourceList(d) => push_list(&mut out, &d.resources),
            NodeData::Resource(d) => {
                push(&mut out, d.type_ref);
                push(&mut out, d.name);
                push(&mut out, d.initializer);
            }
            NodeData::CatchClause(d) => {
                push(&mut out, d.parameter);
                push(&mut out, d.block);
            }
            NodeData::Switch(d) => {
                push(&mut out, d.expression);
                push(&mut out, d.body);
            }
            NodeData::SwitchBody(d) => push_list(&mut out, &d.clauses),
            NodeData::CaseClause(d) => {
                push_list(&mut out, &d.labels);
                push_list(&mut out, &d.statements);
            }
            NodeData::Assert(d) => {
                push(&mut out, d.condition);
                push(&mut out, d.message);
            }
            NodeData::Labeled(d) => push(&mut out, d.statement),
            NodeData::Synchronized(d) => {
                push(&mut out, d.expression);
                push(&mut out, d.block);
            }
            NodeData::FieldAccess(d) => push(&mut out, d.expression),
            NodeData::MethodCall(d) => {
                push(&mut out, d.expression);
                push_list(&mut out, &d.arguments);
            }
            NodeData::ArrayAccess(d) => {
                push(&mut out, d.expression);
                push(&mut out, d.index);
            }
            NodeData::ObjectCreation(d) => {
                push(&mut out, d.outer);
                push(&mut out, d.type_ref);
                push_list(&mut out, &d.arguments);
                if let Some(body) = &d.body {
                    push_list(&mut out, body);
                }
            }
            NodeData::ArrayCreation(d) => {
                push(&mut out, d.type_ref);
                push_list(&mut out, &d.dimensions);
                push(&mut out, d.initializer);
            }
            NodeData::ArrayInitializer(d) => push_list(&mut out, &d.elements),
            NodeData::Binary(d) => {
                push(&mut out, d.left);
                push(&mut out, d.right);
            }
            NodeData::Unary(d) => push(&mut out, d.operand),
            NodeData::Conditional(d) => {
                push(&mut out, d.condition);
                push(&mut out, d.when_true);
                push(&mut out, d.when_false);
            }
            NodeData::Cast(d) => {
                push(&mut out, d.type_ref);
                push(&mut out, d.expression);
            }
            NodeData::InstanceOf(d) => {
                push(&mut out, d.expression);
                push(&mut out, d.type_ref);
            }
            NodeData::Lambda(d) => {
                push_list(&mut out, &d.parameters);
                push(&mut out, d.body);
            }
            NodeData::MethodReference(d) => push(&mut out, d.expression),
            NodeData::ClassLiteral(d) => push(&mut out, d.type_ref),
        }
        out
    }

    /// Pre-order walk of the subtree rooted at `root`, `root` included.
    pub fn descendants(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if self.get(idx).is_none() {
                continue;
            }
            out.push(idx);
            let children = self.children(idx);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Every `NameExpression` reachable from `root`, in source order.
    pub fn name_uses(&self, root: NodeIndex) -> Vec<NodeIndex> {
        self.descendants(root)
            .into_iter()
            .filter(|&idx| self.kind(idx) == Some(NodeKind::NameExpression))
            .collect()
    }

    /// Nearest ancestor (excluding `idx`) of the given kind.
    pub fn find_ancestor(&self, idx: NodeIndex, kind: NodeKind) -> NodeIndex {
        let mut current = self.parent(idx);
        while current.is_some() {
            if self.kind(current) == Some(kind) {
                return current;
            }
            current = self.parent(current);
        }
        NodeIndex::NONE
    }
}

//! Scope-tree construction.
//!
//! A single pre-order walk over the syntax tree with an explicit work stack.
//! Each pending node carries the [`BindContext`] it is bound in, so the
//! current scope is threaded through the walk instead of living in the
//! binder. Declarations are inserted when their declaring construct is
//! visited; order-sensitive visibility is decided later from positions.

use crate::scopes::{ScopeId, ScopeKind};
use crate::state::{BindError, BinderState};
use crate::symbols::{Symbol, SymbolAttributes, SymbolId, SymbolKind};
use jscope_parser::parser::node::ParameterData;
use jscope_parser::{ModifierFlags, Node, NodeArena, NodeIndex, NodeKind, NodeList};
use smallvec::SmallVec;
use tracing::trace;

#[derive(Clone, Copy, Debug)]
struct BindContext {
    scope: ScopeId,
    /// Construct that owns declarations made in this context.
    owner: NodeIndex,
    /// Modifiers every field declared here gets implicitly.
    member_defaults: ModifierFlags,
}

impl BindContext {
    fn in_scope(self, scope: ScopeId) -> Self {
        BindContext { scope, ..self }
    }

    fn in_type_body(scope: ScopeId, owner: NodeIndex, member_defaults: ModifierFlags) -> Self {
        BindContext {
            scope,
            owner,
            member_defaults,
        }
    }
}

/// Children scheduled by one node, in source order.
type Pending = SmallVec<[(NodeIndex, BindContext); 8]>;

fn malformed(node: NodeIndex, reason: &'static str) -> BindError {
    BindError::MalformedTree { node, reason }
}

fn push(out: &mut Pending, idx: NodeIndex, ctx: BindContext) {
    if idx.is_some() {
        out.push((idx, ctx));
    }
}

fn push_list(out: &mut Pending, list: &NodeList, ctx: BindContext) {
    out.extend(list.iter().filter(|idx| idx.is_some()).map(|idx| (idx, ctx)));
}

fn push_children(out: &mut Pending, arena: &NodeArena, idx: NodeIndex, ctx: BindContext) {
    out.extend(arena.children(idx).into_iter().map(|child| (child, ctx)));
}

fn parameter_of(arena: &NodeArena, idx: NodeIndex) -> Result<&ParameterData, BindError> {
    arena
        .get(idx)
        .and_then(|node| arena.get_parameter(node))
        .ok_or_else(|| malformed(idx, "parameter without a parameter payload"))
}

impl BinderState {
    pub(crate) fn bind_tree(&mut self, arena: &NodeArena, root: NodeIndex) -> Result<(), BindError> {
        match arena.get(root) {
            Some(node) if node.kind == NodeKind::CompilationUnit => {}
            _ => return Err(malformed(root, "root is not a compilation unit")),
        }

        let top_level = BindContext {
            scope: ScopeId::NONE,
            owner: NodeIndex::NONE,
            member_defaults: ModifierFlags::empty(),
        };
        let mut stack = vec![(root, top_level)];
        let mut pending = Pending::new();

        while let Some((idx, ctx)) = stack.pop() {
            let node = arena
                .get(idx)
                .ok_or_else(|| malformed(idx, "child index outside the arena"))?;
            if ctx.scope.is_some() {
                self.node_scopes.insert(idx.0, ctx.scope);
            }

            pending.clear();
            self.bind_node(arena, idx, node, ctx, &mut pending)?;
            stack.extend(pending.drain(..).rev());
        }
        Ok(())
    }

    /// Create scopes and declarations for `node` and schedule its children.
    fn bind_node(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        node: &Node,
        ctx: BindContext,
        out: &mut Pending,
    ) -> Result<(), BindError> {
        match node.kind {
            kind if kind.is_type_declaration() => {
                self.bind_type_declaration(arena, idx, node, ctx, out)
            }
            NodeKind::EnumConstant => {
                let data = arena
                    .get_enum_constant(node)
                    .ok_or_else(|| malformed(idx, "enum constant without a payload"))?;
                push(out, data.name, ctx);
                push_list(out, &data.arguments, ctx);
                if let Some(body) = &data.body {
                    let scope = self.enter_scope(ScopeKind::TypeBody, idx, ctx.scope)?;
                    let inner = BindContext::in_type_body(scope, idx, ModifierFlags::empty());
                    push_list(out, body, inner);
                }
                Ok(())
            }
            NodeKind::FieldDeclaration => {
                let data = arena
                    .get_variable(node)
                    .ok_or_else(|| malformed(idx, "field declaration without a payload"))?;
                if ctx.scope.is_none() {
                    return Err(malformed(idx, "field declared outside a type body"));
                }
                let modifiers = data.modifiers | ctx.member_defaults;
                for declarator in data.declarators.iter() {
                    let decl = arena
                        .get(declarator)
                        .and_then(|n| arena.get_variable_declarator(n))
                        .ok_or_else(|| malformed(declarator, "declarator without a payload"))?;
                    self.declare_name(
                        arena,
                        ctx.scope,
                        declarator,
                        decl.name,
                        SymbolKind::Field,
                        ctx.owner,
                        modifiers,
                        None,
                    );
                }
                push_children(out, arena, idx, ctx);
                Ok(())
            }
            NodeKind::MethodDeclaration | NodeKind::ConstructorDeclaration => {
                let data = arena
                    .get_method(node)
                    .ok_or_else(|| malformed(idx, "method without a payload"))?;
                let scope = self.enter_scope(ScopeKind::MethodOrConstructorBody, idx, ctx.scope)?;
                self.declare_parameters(arena, scope, &data.parameters, SymbolKind::FormalParameter, idx)?;
                let inner = BindContext::in_type_body(scope, idx, ModifierFlags::empty());
                push_children(out, arena, idx, inner);
                Ok(())
            }
            NodeKind::CompactConstructorDeclaration => {
                self.bind_compact_constructor(arena, idx, ctx, out)
            }
            NodeKind::Initializer => {
                let inner = BindContext {
                    owner: idx,
                    member_defaults: ModifierFlags::empty(),
                    ..ctx
                };
                push_children(out, arena, idx, inner);
                Ok(())
            }
            NodeKind::Block => {
                let scope = self.enter_scope(ScopeKind::Block, idx, ctx.scope)?;
                push_children(out, arena, idx, ctx.in_scope(scope));
                Ok(())
            }
            NodeKind::LocalVariableStatement => {
                let data = arena
                    .get_variable(node)
                    .ok_or_else(|| malformed(idx, "local variable statement without a payload"))?;
                for declarator in data.declarators.iter() {
                    let (start, decl) = arena
                        .get(declarator)
                        .and_then(|n| Some((n.pos, arena.get_variable_declarator(n)?)))
                        .ok_or_else(|| malformed(declarator, "declarator without a payload"))?;
                    self.declare_name(
                        arena,
                        ctx.scope,
                        declarator,
                        decl.name,
                        SymbolKind::LocalVariable,
                        ctx.owner,
                        data.modifiers,
                        Some(start),
                    );
                }
                push_children(out, arena, idx, ctx);
                Ok(())
            }
            NodeKind::ForStatement => {
                let scope = self.enter_scope(ScopeKind::ForInit, idx, ctx.scope)?;
                push_children(out, arena, idx, ctx.in_scope(scope));
                Ok(())
            }
            NodeKind::ForEachStatement => {
                let data = arena
                    .get_for_each(node)
                    .ok_or_else(|| malformed(idx, "for-each statement without a payload"))?;
                let scope = self.enter_scope(ScopeKind::ForEachHeader, idx, ctx.scope)?;
                if data.variable.is_some() {
                    let variable = parameter_of(arena, data.variable)?;
                    self.declare_name(
                        arena,
                        scope,
                        data.variable,
                        variable.name,
                        SymbolKind::LocalVariable,
                        idx,
                        variable.modifiers,
                        None,
                    );
                }
                let header = ctx.in_scope(scope);
                push(out, data.variable, header);
                // The iterable cannot see the loop variable.
                push(out, data.expression, ctx);
                push(out, data.statement, header);
                Ok(())
            }
            NodeKind::TryStatement => self.bind_try_statement(arena, idx, node, ctx, out),
            NodeKind::ResourceList => {
                let data = arena
                    .get_resource_list(node)
                    .ok_or_else(|| malformed(idx, "resource list without a payload"))?;
                if data.resources.is_empty() {
                    return Err(malformed(idx, "resource list without resources"));
                }
                push_children(out, arena, idx, ctx);
                Ok(())
            }
            NodeKind::CatchClause => {
                let data = arena
                    .get_catch_clause(node)
                    .ok_or_else(|| malformed(idx, "catch clause without a payload"))?;
                let scope = self.enter_scope(ScopeKind::CatchClause, idx, ctx.scope)?;
                if data.parameter.is_some() {
                    let parameter = parameter_of(arena, data.parameter)?;
                    self.declare_name(
                        arena,
                        scope,
                        data.parameter,
                        parameter.name,
                        SymbolKind::ExceptionParameter,
                        idx,
                        parameter.modifiers,
                        None,
                    );
                }
                push_children(out, arena, idx, ctx.in_scope(scope));
                Ok(())
            }
            NodeKind::SwitchStatement | NodeKind::SwitchExpression => {
                let data = arena
                    .get_switch(node)
                    .ok_or_else(|| malformed(idx, "switch without a payload"))?;
                if data.body.is_none() {
                    return Err(malformed(idx, "switch without a body"));
                }
                // Selector and body are siblings; only the body opens a scope.
                push_children(out, arena, idx, ctx);
                Ok(())
            }
            NodeKind::SwitchBody => {
                let scope = self.enter_scope(ScopeKind::SwitchBody, idx, ctx.scope)?;
                push_children(out, arena, idx, ctx.in_scope(scope));
                Ok(())
            }
            NodeKind::Lambda => {
                let data = arena
                    .get_lambda(node)
                    .ok_or_else(|| malformed(idx, "lambda without a payload"))?;
                let scope = self.enter_scope(ScopeKind::LambdaParameters, idx, ctx.scope)?;
                self.declare_parameters(arena, scope, &data.parameters, SymbolKind::FormalParameter, idx)?;
                let inner = BindContext::in_type_body(scope, idx, ModifierFlags::empty());
                push_children(out, arena, idx, inner);
                Ok(())
            }
            NodeKind::ObjectCreation => {
                let data = arena
                    .get_object_creation(node)
                    .ok_or_else(|| malformed(idx, "object creation without a payload"))?;
                push(out, data.outer, ctx);
                push(out, data.type_ref, ctx);
                push_list(out, &data.arguments, ctx);
                if let Some(body) = &data.body {
                    let scope = self.enter_scope(ScopeKind::TypeBody, idx, ctx.scope)?;
                    let inner = BindContext::in_type_body(scope, idx, ModifierFlags::empty());
                    push_list(out, body, inner);
                }
                Ok(())
            }
            _ => {
                push_children(out, arena, idx, ctx);
                Ok(())
            }
        }
    }

    fn bind_type_declaration(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        node: &Node,
        ctx: BindContext,
        out: &mut Pending,
    ) -> Result<(), BindError> {
        let data = arena
            .get_type_decl(node)
            .ok_or_else(|| malformed(idx, "type declaration without a payload"))?;
        let scope = self.enter_scope(ScopeKind::TypeBody, idx, ctx.scope)?;
        let implicit_constant = ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL;
        let member_defaults = match node.kind {
            NodeKind::InterfaceDeclaration | NodeKind::AnnotationTypeDeclaration => implicit_constant,
            _ => ModifierFlags::empty(),
        };

        // Every record has a canonical constructor, so components are
        // always fields of the body.
        for component in data.components.iter() {
            let parameter = parameter_of(arena, component)?;
            self.declare_name(
                arena,
                scope,
                component,
                parameter.name,
                SymbolKind::RecordComponentField,
                idx,
                parameter.modifiers,
                None,
            );
        }
        for constant in data.enum_constants.iter() {
            let name = arena
                .get(constant)
                .and_then(|n| arena.get_enum_constant(n))
                .map(|c| c.name)
                .ok_or_else(|| malformed(constant, "enum constant without a payload"))?;
            self.declare_name(
                arena,
                scope,
                constant,
                name,
                SymbolKind::Field,
                idx,
                implicit_constant,
                None,
            );
        }

        trace!(
            "[BIND] type body of node {} has {} components, {} constants, {} members",
            idx.0,
            data.components.len(),
            data.enum_constants.len(),
            data.members.len()
        );
        push_children(
            out,
            arena,
            idx,
            BindContext::in_type_body(scope, idx, member_defaults),
        );
        Ok(())
    }

    /// Compact constructors see the record components as their own
    /// parameters, shadowing the component fields.
    fn bind_compact_constructor(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        ctx: BindContext,
        out: &mut Pending,
    ) -> Result<(), BindError> {
        let record = arena.parent(idx);
        let components = arena
            .get(record)
            .filter(|n| n.kind == NodeKind::RecordDeclaration)
            .and_then(|n| arena.get_type_decl(n))
            .map(|d| &d.components)
            .ok_or_else(|| malformed(idx, "compact constructor outside a record declaration"))?;

        let scope = self.enter_scope(ScopeKind::CompactConstructorBody, idx, ctx.scope)?;
        for component in components.iter() {
            let parameter = parameter_of(arena, component)?;
            // The component's name node already declares the field.
            self.declare_name(
                arena,
                scope,
                NodeIndex::NONE,
                parameter.name,
                SymbolKind::RecordComponentParameter,
                idx,
                parameter.modifiers,
                None,
            );
        }
        push_children(
            out,
            arena,
            idx,
            BindContext::in_type_body(scope, idx, ModifierFlags::empty()),
        );
        Ok(())
    }

    /// `try (resources) body catch... finally`.
    ///
    /// Resources and the body share one scope; catch clauses and the finally
    /// block are bound in the scope enclosing the whole statement.
    fn bind_try_statement(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        node: &Node,
        ctx: BindContext,
        out: &mut Pending,
    ) -> Result<(), BindError> {
        let data = arena
            .get_try(node)
            .ok_or_else(|| malformed(idx, "try statement without a payload"))?;

        if data.resources.is_some() {
            let list = arena
                .get(data.resources)
                .and_then(|n| arena.get_resource_list(n))
                .ok_or_else(|| malformed(data.resources, "try resources without a resource list"))?;
            if list.resources.is_empty() {
                return Err(malformed(data.resources, "resource list without resources"));
            }
            let scope = self.enter_scope(ScopeKind::TryResourceList, data.resources, ctx.scope)?;
            for resource in list.resources.iter() {
                let (end, decl) = arena
                    .get(resource)
                    .and_then(|n| Some((n.end, arena.get_resource(n)?)))
                    .ok_or_else(|| malformed(resource, "resource without a payload"))?;
                if decl.name.is_none() {
                    continue;
                }
                // Visible only once the whole resource, initializer included,
                // has been read.
                self.declare_name(
                    arena,
                    scope,
                    resource,
                    decl.name,
                    SymbolKind::ResourceVariable,
                    data.resources,
                    decl.modifiers,
                    Some(end),
                );
            }
            let resources = ctx.in_scope(scope);
            push(out, data.resources, resources);
            push(out, data.try_block, resources);
        } else {
            push(out, data.try_block, ctx);
        }
        push_list(out, &data.catch_clauses, ctx);
        push(out, data.finally_block, ctx);
        Ok(())
    }

    fn declare_parameters(
        &mut self,
        arena: &NodeArena,
        scope: ScopeId,
        parameters: &NodeList,
        kind: SymbolKind,
        owner: NodeIndex,
    ) -> Result<(), BindError> {
        for param in parameters.iter() {
            let data = parameter_of(arena, param)?;
            self.declare_name(arena, scope, param, data.name, kind, owner, data.modifiers, None);
        }
        Ok(())
    }

    /// Declare the name held by `name_node`. Recovered trees may lack the
    /// name, in which case nothing is declared.
    fn declare_name(
        &mut self,
        arena: &NodeArena,
        scope: ScopeId,
        declaring_node: NodeIndex,
        name_node: NodeIndex,
        kind: SymbolKind,
        owner: NodeIndex,
        modifiers: ModifierFlags,
        visible_from: Option<u32>,
    ) -> Option<SymbolId> {
        let position = arena.get(name_node)?.pos;
        let name = arena.get_identifier_name(name_node)?;
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            owner,
            declaration: name_node,
            declaration_position: position,
            visible_from: visible_from.unwrap_or(position),
            attributes: SymbolAttributes {
                modifiers: modifiers | kind.default_modifiers(),
            },
        };
        Some(self.declare_symbol(scope, declaring_node, symbol))
    }
}

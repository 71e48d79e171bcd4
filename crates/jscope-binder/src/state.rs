//! Binder state: the mutable scope-tree builder and its frozen output.

use crate::scopes::{Scope, ScopeArena, ScopeId, ScopeKind, TableEntry};
use crate::symbols::{Symbol, SymbolArena, SymbolId};
use jscope_common::diagnostics::{Diagnostic, diagnostic_codes};
use jscope_common::limits::MAX_SCOPE_DEPTH;
use jscope_parser::{NodeArena, NodeIndex};
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::{Level, debug, span, warn};

/// Configuration options for the binder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinderOptions {
    /// Emit a diagnostic for each duplicate declaration in one scope.
    pub report_duplicates: bool,
    /// Scope nesting at which binding gives up.
    pub max_scope_depth: u32,
}

impl Default for BinderOptions {
    fn default() -> Self {
        BinderOptions {
            report_duplicates: true,
            max_scope_depth: MAX_SCOPE_DEPTH,
        }
    }
}

/// Fatal binding failure: the tree broke a structural guarantee of the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindError {
    MalformedTree { node: NodeIndex, reason: &'static str },
    ScopeTooDeep { node: NodeIndex, limit: u32 },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::MalformedTree { node, reason } => {
                write!(f, "malformed syntax tree at node {}: {reason}", node.0)
            }
            BindError::ScopeTooDeep { node, limit } => write!(
                f,
                "scopes nested deeper than {limit} levels at node {}",
                node.0
            ),
        }
    }
}

impl std::error::Error for BindError {}

/// Builds the scope tree of one compilation unit.
///
/// Consumed by [`BinderState::bind_compilation_unit`]; the returned
/// [`BoundUnit`] is the only way to query the result, so tables can no longer
/// change once binding finishes.
pub struct BinderState {
    pub(crate) file_name: String,
    pub(crate) options: BinderOptions,
    pub(crate) symbols: SymbolArena,
    pub(crate) scopes: ScopeArena,
    /// Node -> innermost scope the node is evaluated in.
    pub(crate) node_scopes: FxHashMap<u32, ScopeId>,
    /// Scope-introducing node -> the scope it introduces.
    pub(crate) construct_scopes: FxHashMap<u32, ScopeId>,
    /// Declaring node or its name -> symbol.
    pub(crate) declaration_symbols: FxHashMap<u32, SymbolId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl BinderState {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self::with_options(file_name, BinderOptions::default())
    }

    pub fn with_options(file_name: impl Into<String>, options: BinderOptions) -> Self {
        BinderState {
            file_name: file_name.into(),
            options,
            symbols: SymbolArena::new(),
            scopes: ScopeArena::new(),
            node_scopes: FxHashMap::default(),
            construct_scopes: FxHashMap::default(),
            declaration_symbols: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Build the scope tree for the compilation unit rooted at `root`.
    pub fn bind_compilation_unit(
        mut self,
        arena: &NodeArena,
        root: NodeIndex,
    ) -> Result<BoundUnit, BindError> {
        let _span = span!(Level::DEBUG, "bind_compilation_unit", file = %self.file_name).entered();

        self.bind_tree(arena, root)?;

        debug!(
            "bound {}: {} scopes, {} symbols, {} diagnostics",
            self.file_name,
            self.scopes.len(),
            self.symbols.len(),
            self.diagnostics.len()
        );

        Ok(BoundUnit {
            file_name: self.file_name,
            root,
            symbols: self.symbols,
            scopes: self.scopes,
            node_scopes: self.node_scopes,
            construct_scopes: self.construct_scopes,
            declaration_symbols: self.declaration_symbols,
            diagnostics: self.diagnostics,
        })
    }

    pub(crate) fn enter_scope(
        &mut self,
        kind: ScopeKind,
        node: NodeIndex,
        parent: ScopeId,
    ) -> Result<ScopeId, BindError> {
        let depth = self.scopes.get(parent).map_or(0, |scope| scope.depth + 1);
        if depth > self.options.max_scope_depth {
            return Err(BindError::ScopeTooDeep {
                node,
                limit: self.options.max_scope_depth,
            });
        }
        let id = self.scopes.alloc(Scope {
            kind,
            parent,
            node,
            depth,
            table: Default::default(),
        });
        self.construct_scopes.insert(node.0, id);
        debug!(
            "[SCOPE] created {} scope {} for node {} (parent {:?}, depth {})",
            kind.name(),
            id.0,
            node.0,
            parent,
            depth
        );
        Ok(id)
    }

    /// Allocate `symbol` and insert it into `scope`.
    ///
    /// A name already present in the same scope keeps its first symbol; the
    /// newcomer is still allocated and reachable from its declaration node.
    /// With `declaring_node` set to `NodeIndex::NONE` the symbol is not
    /// registered as the declaration of its name node.
    pub(crate) fn declare_symbol(
        &mut self,
        scope: ScopeId,
        declaring_node: NodeIndex,
        symbol: Symbol,
    ) -> SymbolId {
        let name_node = symbol.declaration;
        let entry_visible_from = symbol.visible_from;
        let position = symbol.declaration_position;
        let name = symbol.name.clone();
        let kind = symbol.kind;

        let sym_id = self.symbols.alloc(symbol);
        if declaring_node.is_some() {
            self.declaration_symbols.insert(name_node.0, sym_id);
            self.declaration_symbols.insert(declaring_node.0, sym_id);
        }

        let inserted = match self.scopes.get_mut(scope) {
            Some(target) => target.table.insert(
                &name,
                TableEntry {
                    symbol: sym_id,
                    visible_from: entry_visible_from,
                },
            ),
            None => Ok(()),
        };

        match inserted {
            Ok(()) => {
                debug!(
                    "[DECLARE] {} '{}' (id={}) in scope {}",
                    kind.name(),
                    name,
                    sym_id.0,
                    scope.0
                );
            }
            Err(existing) => {
                warn!(
                    "[DECLARE] duplicate '{}' at offset {} in scope {}; keeping id={}",
                    name, position, scope.0, existing.0
                );
                if self.options.report_duplicates {
                    self.report_duplicate(&name, position, existing);
                }
            }
        }
        sym_id
    }

    fn report_duplicate(&mut self, name: &str, position: u32, existing: SymbolId) {
        let length = name.len() as u32;
        let mut diagnostic = Diagnostic::from_code(
            self.file_name.clone(),
            position,
            length,
            diagnostic_codes::DUPLICATE_DECLARATION,
            &[name],
        );
        if let Some(first) = self.symbols.get(existing) {
            diagnostic = diagnostic.with_related(
                self.file_name.clone(),
                first.declaration_position,
                length,
                format!("'{name}' was first declared here."),
            );
        }
        self.diagnostics.push(diagnostic);
    }
}

/// How a name use resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Resolution {
    Resolved(SymbolId),
    Unresolved,
}

impl Resolution {
    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// A name use paired with its resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedUse {
    pub node: NodeIndex,
    pub resolution: Resolution,
}

/// Frozen scope tree of one compilation unit.
///
/// Queries take `&self` only, so one unit can be shared across threads.
#[derive(Debug)]
pub struct BoundUnit {
    pub(crate) file_name: String,
    pub(crate) root: NodeIndex,
    pub(crate) symbols: SymbolArena,
    pub(crate) scopes: ScopeArena,
    pub(crate) node_scopes: FxHashMap<u32, ScopeId>,
    pub(crate) construct_scopes: FxHashMap<u32, ScopeId>,
    pub(crate) declaration_symbols: FxHashMap<u32, SymbolId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl BoundUnit {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn symbols(&self) -> &SymbolArena {
        &self.symbols
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Innermost scope `node` is evaluated in. For a scope-introducing node
    /// this is the enclosing scope; see [`BoundUnit::construct_scope`].
    pub fn scope_of(&self, node: NodeIndex) -> Option<ScopeId> {
        self.node_scopes.get(&node.0).copied()
    }

    /// Scope introduced by `node`, if it introduces one.
    pub fn construct_scope(&self, node: NodeIndex) -> Option<ScopeId> {
        self.construct_scopes.get(&node.0).copied()
    }

    /// Symbol declared by `node`: a declared name, declarator, parameter,
    /// resource, enum constant or record component.
    pub fn symbol_of_declaration(&self, node: NodeIndex) -> Option<SymbolId> {
        self.declaration_symbols.get(&node.0).copied()
    }

    /// Duplicate-declaration diagnostics found while binding.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

//! Name resolution over a frozen scope tree.

use crate::scopes::ScopeId;
use crate::state::{BoundUnit, Resolution, ResolvedUse};
use crate::symbols::{SymbolId, SymbolKind};
use jscope_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use jscope_parser::{NodeArena, NodeIndex, NodeKind};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{Level, debug, span, trace};

impl BoundUnit {
    /// Resolve `name` as seen from `position` inside `scope`.
    ///
    /// Walks outward through parent links and returns the first symbol whose
    /// scope makes it visible at `position`.
    pub fn resolve(&self, scope: ScopeId, name: &str, position: u32) -> Resolution {
        let mut scope_id = scope;
        let mut iterations = 0;
        while scope_id.is_some() {
            iterations += 1;
            if iterations > MAX_SCOPE_WALK_ITERATIONS {
                debug!(
                    "[RESOLVE] '{}' gave up after {} scopes",
                    name, MAX_SCOPE_WALK_ITERATIONS
                );
                break;
            }
            let Some(current) = self.scopes.get(scope_id) else {
                break;
            };
            if let Some(sym_id) = current.visible(name, position) {
                trace!(
                    "[RESOLVE] '{}' found in {} scope {} (id={})",
                    name,
                    current.kind.name(),
                    scope_id.0,
                    sym_id.0
                );
                return Resolution::Resolved(sym_id);
            }
            trace!(
                "[RESOLVE] '{}' not visible in {} scope {}",
                name,
                current.kind.name(),
                scope_id.0
            );
            scope_id = current.parent;
        }
        Resolution::Unresolved
    }

    /// Resolve the `NameExpression` at `node`.
    ///
    /// Returns `None` when `node` is not a name use of this unit.
    pub fn resolve_name_use(&self, arena: &NodeArena, node: NodeIndex) -> Option<Resolution> {
        let use_node = arena.get(node)?;
        if use_node.kind != NodeKind::NameExpression {
            return None;
        }
        let name = arena.get_identifier_name(node)?;
        let _span = span!(Level::DEBUG, "resolve_name_use", node = node.0, name).entered();
        let scope = self.scope_of(node).unwrap_or(ScopeId::NONE);
        Some(self.resolve(scope, name, use_node.pos))
    }

    /// Every name use of the unit with its resolution, in source order.
    pub fn resolve_all_uses(&self, arena: &NodeArena) -> Vec<ResolvedUse> {
        arena
            .name_uses(self.root)
            .into_iter()
            .filter_map(|node| {
                let resolution = self.resolve_name_use(arena, node)?;
                Some(ResolvedUse { node, resolution })
            })
            .collect()
    }

    /// Same as [`BoundUnit::resolve_all_uses`], resolving on the rayon pool.
    pub fn par_resolve_all_uses(&self, arena: &NodeArena) -> Vec<ResolvedUse> {
        arena
            .name_uses(self.root)
            .into_par_iter()
            .filter_map(|node| {
                let resolution = self.resolve_name_use(arena, node)?;
                Some(ResolvedUse { node, resolution })
            })
            .collect()
    }

    /// All symbols visible at `position` inside `scope`, innermost first.
    ///
    /// A name hidden by a closer visible declaration is listed once, for the
    /// closer symbol.
    pub fn visible_symbols_at(&self, scope: ScopeId, position: u32) -> Vec<SymbolId> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut visible = Vec::new();
        let mut scope_id = scope;
        let mut iterations = 0;
        while scope_id.is_some() && iterations < MAX_SCOPE_WALK_ITERATIONS {
            iterations += 1;
            let Some(current) = self.scopes.get(scope_id) else {
                break;
            };
            for (name, _) in current.table.iter() {
                if seen.contains(name) {
                    continue;
                }
                if let Some(sym_id) = current.visible(name, position) {
                    seen.insert(name);
                    visible.push(sym_id);
                }
            }
            scope_id = current.parent;
        }
        visible
    }

    /// Whether the name use at `node` resolves to a variable whose own
    /// initializer contains the use, as in `int l = k + l;`.
    ///
    /// Such uses resolve normally; callers decide whether to flag them.
    pub fn is_self_reference_in_initializer(&self, arena: &NodeArena, node: NodeIndex) -> bool {
        let Some(Resolution::Resolved(sym_id)) = self.resolve_name_use(arena, node) else {
            return false;
        };
        let Some(symbol) = self.symbols.get(sym_id) else {
            return false;
        };
        if !matches!(symbol.kind, SymbolKind::Field | SymbolKind::LocalVariable) {
            return false;
        }
        let declarator = arena.parent(symbol.declaration);
        let Some(initializer) = arena
            .get(declarator)
            .and_then(|n| arena.get_variable_declarator(n))
            .map(|d| d.initializer)
            .and_then(|init| arena.get(init))
        else {
            return false;
        };
        let Some(use_node) = arena.get(node) else {
            return false;
        };
        initializer.pos <= use_node.pos && use_node.end <= initializer.end
    }
}

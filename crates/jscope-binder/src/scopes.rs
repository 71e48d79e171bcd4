//! Scope nodes and the two visibility policies.

use crate::symbols::SymbolId;
use indexmap::IndexMap;
use jscope_parser::NodeIndex;
use rustc_hash::FxBuildHasher;
use serde::Serialize;

/// Index of a scope in its [`ScopeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == ScopeId::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != ScopeId::NONE
    }
}

/// The construct that introduced a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeKind {
    TypeBody,
    MethodOrConstructorBody,
    CompactConstructorBody,
    Block,
    TryResourceList,
    CatchClause,
    SwitchBody,
    ForEachHeader,
    /// Init part of a basic `for` statement.
    ForInit,
    LambdaParameters,
}

impl ScopeKind {
    pub fn visibility(self) -> VisibilityPolicy {
        match self {
            ScopeKind::Block
            | ScopeKind::SwitchBody
            | ScopeKind::TryResourceList
            | ScopeKind::ForInit => VisibilityPolicy::OrderSensitive,
            ScopeKind::TypeBody
            | ScopeKind::MethodOrConstructorBody
            | ScopeKind::CompactConstructorBody
            | ScopeKind::CatchClause
            | ScopeKind::ForEachHeader
            | ScopeKind::LambdaParameters => VisibilityPolicy::OrderIndependent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScopeKind::TypeBody => "type body",
            ScopeKind::MethodOrConstructorBody => "method or constructor body",
            ScopeKind::CompactConstructorBody => "compact constructor body",
            ScopeKind::Block => "block",
            ScopeKind::TryResourceList => "try resource list",
            ScopeKind::CatchClause => "catch clause",
            ScopeKind::SwitchBody => "switch body",
            ScopeKind::ForEachHeader => "for-each header",
            ScopeKind::ForInit => "for init",
            ScopeKind::LambdaParameters => "lambda parameters",
        }
    }
}

/// Decides which entries of a table a query position can see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VisibilityPolicy {
    /// Every entry is visible anywhere inside the scope.
    OrderIndependent,
    /// An entry is visible from its `visible_from` offset onwards.
    OrderSensitive,
}

impl VisibilityPolicy {
    #[inline]
    pub fn visible(self, table: &SymbolTable, name: &str, position: u32) -> Option<SymbolId> {
        let entry = table.entry(name)?;
        match self {
            VisibilityPolicy::OrderIndependent => Some(entry.symbol),
            VisibilityPolicy::OrderSensitive => {
                (position >= entry.visible_from).then_some(entry.symbol)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableEntry {
    pub symbol: SymbolId,
    pub visible_from: u32,
}

/// Name to symbol mapping in declaration order.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: IndexMap<String, TableEntry, FxBuildHasher>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.entries.get(name).map(|entry| entry.symbol)
    }

    #[inline]
    pub fn entry(&self, name: &str) -> Option<&TableEntry> {
        self.entries.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableEntry)> + '_ {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Insert unless the name is already present.
    ///
    /// Returns the symbol that already holds the name on collision.
    pub(crate) fn insert(&mut self, name: &str, entry: TableEntry) -> Result<(), SymbolId> {
        if let Some(existing) = self.entries.get(name) {
            return Err(existing.symbol);
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: ScopeId,
    /// Node that introduced the scope.
    pub node: NodeIndex,
    /// Number of ancestors.
    pub depth: u32,
    pub table: SymbolTable,
}

impl Scope {
    #[inline]
    pub fn visible(&self, name: &str, position: u32) -> Option<SymbolId> {
        self.kind.visibility().visible(&self.table, name, position)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena::default()
    }

    pub(crate) fn alloc(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        if id.is_none() {
            return None;
        }
        self.scopes.get(id.0 as usize)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        if id.is_none() {
            return None;
        }
        self.scopes.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, scope)| (ScopeId(i as u32), scope))
    }

    /// Direct children of `parent`, in creation order.
    pub fn children(&self, parent: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        self.iter()
            .filter(move |(_, scope)| scope.parent == parent)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(name: &str, visible_from: u32) -> SymbolTable {
        let mut table = SymbolTable::new();
        table
            .insert(
                name,
                TableEntry {
                    symbol: SymbolId(7),
                    visible_from,
                },
            )
            .unwrap();
        table
    }

    #[test]
    fn order_sensitive_hides_entries_before_their_start() {
        let table = table_with("x", 10);
        let policy = ScopeKind::Block.visibility();
        assert_eq!(policy.visible(&table, "x", 9), None);
        assert_eq!(policy.visible(&table, "x", 10), Some(SymbolId(7)));
        assert_eq!(policy.visible(&table, "x", 50), Some(SymbolId(7)));
    }

    #[test]
    fn order_independent_ignores_position() {
        let table = table_with("x", 10);
        let policy = ScopeKind::TypeBody.visibility();
        assert_eq!(policy.visible(&table, "x", 0), Some(SymbolId(7)));
        assert_eq!(policy.visible(&table, "y", 0), None);
    }

    #[test]
    fn insert_keeps_the_first_entry() {
        let mut table = table_with("x", 10);
        let second = TableEntry {
            symbol: SymbolId(8),
            visible_from: 20,
        };
        assert_eq!(table.insert("x", second), Err(SymbolId(7)));
        assert_eq!(table.get("x"), Some(SymbolId(7)));
        assert_eq!(table.len(), 1);
    }
}

//! Symbol model: one record per declared variable-like name.

use jscope_parser::{ModifierFlags, NodeIndex};
use serde::Serialize;

/// Index of a symbol in its [`SymbolArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == SymbolId::NONE
    }
}

/// What kind of declaration introduced a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Field,
    FormalParameter,
    LocalVariable,
    ExceptionParameter,
    ResourceVariable,
    /// A record component seen from the record body.
    RecordComponentField,
    /// A record component seen from inside a compact constructor.
    RecordComponentParameter,
}

impl SymbolKind {
    /// Modifiers implied by the kind itself, on top of anything declared.
    pub fn default_modifiers(self) -> ModifierFlags {
        match self {
            SymbolKind::RecordComponentField => ModifierFlags::PRIVATE | ModifierFlags::FINAL,
            SymbolKind::ResourceVariable => ModifierFlags::FINAL,
            SymbolKind::Field
            | SymbolKind::FormalParameter
            | SymbolKind::LocalVariable
            | SymbolKind::ExceptionParameter
            | SymbolKind::RecordComponentParameter => ModifierFlags::empty(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SymbolKind::Field => "field",
            SymbolKind::FormalParameter => "formal parameter",
            SymbolKind::LocalVariable => "local variable",
            SymbolKind::ExceptionParameter => "exception parameter",
            SymbolKind::ResourceVariable => "resource variable",
            SymbolKind::RecordComponentField => "record component field",
            SymbolKind::RecordComponentParameter => "record component parameter",
        }
    }
}

/// Opaque pass-through data. Resolution never looks at it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolAttributes {
    pub modifiers: ModifierFlags,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declaring construct: type declaration, method, lambda, catch clause,
    /// resource list, for statement, initializer, ...
    pub owner: NodeIndex,
    /// The `Identifier` node naming the symbol.
    pub declaration: NodeIndex,
    /// Byte offset of the declared name.
    pub declaration_position: u32,
    /// First position at which an order-sensitive scope exposes the symbol.
    pub visible_from: u32,
    pub attributes: SymbolAttributes,
}

impl Symbol {
    pub fn modifiers(&self) -> ModifierFlags {
        self.attributes.modifiers
    }
}

/// Append-only storage for the symbols of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        SymbolArena::default()
    }

    pub(crate) fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        if id.is_none() {
            return None;
        }
        self.symbols.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (SymbolId(i as u32), symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_component_fields_default_to_private_final() {
        assert_eq!(
            SymbolKind::RecordComponentField.default_modifiers(),
            ModifierFlags::PRIVATE | ModifierFlags::FINAL
        );
        assert!(
            SymbolKind::RecordComponentParameter
                .default_modifiers()
                .is_empty()
        );
    }

    #[test]
    fn none_id_is_never_found() {
        let arena = SymbolArena::new();
        assert!(arena.get(SymbolId::NONE).is_none());
        assert!(arena.get(SymbolId(0)).is_none());
    }
}

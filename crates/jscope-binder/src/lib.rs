//! Scope-tree builder and simple-name resolver.
//!
//! [`BinderState`] walks a parsed compilation unit once and produces a
//! [`BoundUnit`]: a tree of scopes holding the fields, parameters, locals,
//! catch parameters, resources and record components declared in the unit.
//! The bound unit answers which declaration a simple name refers to at a
//! given position, honouring declaration order, shadowing, try-with-resources
//! scoping, switch fallthrough and record constructor rules.

pub mod scopes;
pub mod symbols;

mod resolver;
mod state;
mod state_node_binding;

pub use scopes::{Scope, ScopeArena, ScopeId, ScopeKind, SymbolTable, TableEntry, VisibilityPolicy};
pub use state::{BindError, BinderOptions, BinderState, BoundUnit, Resolution, ResolvedUse};
pub use symbols::{Symbol, SymbolArena, SymbolAttributes, SymbolId, SymbolKind};

use jscope_common::Diagnostic;
use jscope_parser::{NodeArena, NodeIndex};

/// Failure of [`bind_source`].
#[derive(Debug)]
pub enum SourceError {
    Parse(jscope_parser::ParseError),
    Bind(BindError),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Parse(err) => write!(f, "parse failed: {err}"),
            SourceError::Bind(err) => write!(f, "binding failed: {err}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Parse(err) => Some(err),
            SourceError::Bind(err) => Some(err),
        }
    }
}

/// Parse and bind one compilation unit.
///
/// Returns the arena, its root, the bound unit and the parser diagnostics.
pub fn bind_source(
    file_name: &str,
    source: &str,
    options: BinderOptions,
) -> Result<(NodeArena, NodeIndex, BoundUnit, Vec<Diagnostic>), SourceError> {
    let (arena, root, diagnostics) =
        jscope_parser::parse_source(file_name, source).map_err(SourceError::Parse)?;
    let bound = BinderState::with_options(file_name, options)
        .bind_compilation_unit(&arena, root)
        .map_err(SourceError::Bind)?;
    Ok((arena, root, bound, diagnostics))
}

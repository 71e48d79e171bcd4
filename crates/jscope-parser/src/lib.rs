//! Java-like parser and syntax tree for the jscope name-resolution engine.
//!
//! The tree lives in a [`NodeArena`]; nodes are addressed by [`NodeIndex`]
//! and carry parent links once parsing finishes.

pub mod parser;

pub use parser::base::{NodeIndex, NodeList};
pub use parser::flags::ModifierFlags;
pub use parser::node::{Node, NodeArena, NodeKind};
pub use parser::state::{ParseError, ParserState};

/// Parse a whole compilation unit.
///
/// Returns the arena, its root node and the recoverable diagnostics.
pub fn parse_source(
    file_name: &str,
    source: &str,
) -> Result<(NodeArena, NodeIndex, Vec<jscope_common::Diagnostic>), ParseError> {
    let mut parser = ParserState::new(file_name.to_string(), source.to_string());
    let root = parser.parse_compilation_unit()?;
    let (arena, diagnostics) = parser.into_parts();
    Ok((arena, root, diagnostics))
}

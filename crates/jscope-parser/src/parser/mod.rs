//! Syntax tree types and the recursive-descent parser.

pub mod base;
pub mod flags;
pub mod node;
mod node_access;
mod node_arena;
pub mod state;
mod state_expressions;
mod state_statements;
mod state_statements_class_members;
mod state_types;

//! Java-like source scanner for the jscope name-resolution engine.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `Token` - A token with its byte range
//! - `ScannerState` - Tokenizer producing the whole token stream up front

pub mod scanner;
pub mod syntax_kind;

pub use scanner::{ScanResult, ScannerState, Token};
pub use syntax_kind::{SyntaxKind, keyword_kind};

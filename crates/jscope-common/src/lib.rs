//! Common types and utilities for the jscope name-resolution engine.
//!
//! This crate provides foundational types used across all jscope crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, stable codes)
//! - Position/line-map types for turning byte offsets into line/column
//! - Centralized limits

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes, format_message};

// Centralized limits and thresholds
pub mod limits;

// Line/column source locations
pub mod position;
pub use position::{LineMap, Position};

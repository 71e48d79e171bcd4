//! Command-line front end for the jscope name-resolution engine.
//!
//! The engine itself lives in the workspace crates: `jscope-parser` builds
//! the syntax tree and `jscope-binder` builds the scope tree and resolves
//! names. This crate discovers sources, runs them through both in parallel
//! and reports the results.

pub mod cli;
pub mod tracing_config;

pub use jscope_binder::{BinderOptions, BoundUnit, Resolution, bind_source};

//! Source discovery and the per-file parse, bind and resolve pipeline.
//!
//! Every compilation unit gets its own arena and scope tree, so files are
//! processed independently on a rayon pool and reported in path order.

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};
use walkdir::WalkDir;

use jscope_binder::{BinderOptions, BoundUnit, Resolution, ScopeId, bind_source};
use jscope_common::{Diagnostic, LineMap, diagnostic_codes};
use jscope_parser::NodeArena;

use crate::cli::args::CliArgs;

/// Rayon workers parse recursively; give them room for deeply nested units.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

const SOURCE_EXTENSION: &str = "java";

/// What to compute for each file.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyzeOptions {
    pub binder: BinderOptions,
    pub unresolved_only: bool,
    pub show_scopes: bool,
}

impl AnalyzeOptions {
    pub fn from_args(args: &CliArgs) -> Self {
        AnalyzeOptions {
            binder: BinderOptions {
                report_duplicates: !args.allow_duplicates,
                ..BinderOptions::default()
            },
            unresolved_only: args.unresolved_only,
            show_scopes: args.show_scopes,
        }
    }
}

/// Outcome of analysing one compilation unit.
#[derive(Clone, Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(skip)]
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: usize,
    pub scopes: usize,
    pub uses: usize,
    pub unresolved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_tree: Option<String>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Compile `--exclude` patterns into one matcher.
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("invalid --exclude glob '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("failed to build --exclude matcher")
}

/// Expand input paths into a sorted, de-duplicated list of source files.
///
/// Files named explicitly are kept whatever their extension; directories are
/// searched recursively for `*.java`. Excluded paths are dropped in both cases.
pub fn discover_sources(paths: &[PathBuf], exclude: &GlobSet) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if !exclude.is_match(path) {
                files.push(path.clone());
            }
            continue;
        }
        if !path.is_dir() {
            bail!("input path '{}' does not exist", path.display());
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if entry_path
                .extension()
                .is_none_or(|ext| ext != SOURCE_EXTENSION)
            {
                continue;
            }
            if exclude.is_match(entry_path) {
                debug!(path = %entry_path.display(), "excluded");
                continue;
            }
            files.push(entry_path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Parse, bind and resolve one in-memory compilation unit.
pub fn analyze_source(file_name: &str, source: &str, options: AnalyzeOptions) -> Result<FileReport> {
    let _span = span!(Level::DEBUG, "analyze_source", file = file_name).entered();

    let (arena, _root, bound, parse_diagnostics) = bind_source(file_name, source, options.binder)
        .with_context(|| format!("failed to analyze {file_name}"))?;

    let uses = bound.resolve_all_uses(&arena);
    let mut unresolved = 0;
    let mut diagnostics = Vec::new();
    if !options.unresolved_only {
        diagnostics.extend(parse_diagnostics);
        diagnostics.extend(bound.diagnostics().iter().cloned());
    }

    for resolved in &uses {
        let Some(node) = arena.get(resolved.node) else {
            continue;
        };
        let Some(name) = arena.get_identifier_name(resolved.node) else {
            continue;
        };
        let length = node.end.saturating_sub(node.pos);
        match resolved.resolution {
            Resolution::Unresolved => {
                unresolved += 1;
                diagnostics.push(Diagnostic::from_code(
                    file_name,
                    node.pos,
                    length,
                    diagnostic_codes::UNRESOLVED_NAME,
                    &[name],
                ));
            }
            Resolution::Resolved(_) => {
                if !options.unresolved_only
                    && bound.is_self_reference_in_initializer(&arena, resolved.node)
                {
                    diagnostics.push(Diagnostic::from_code(
                        file_name,
                        node.pos,
                        length,
                        diagnostic_codes::SELF_REFERENCE_IN_INITIALIZER,
                        &[name],
                    ));
                }
            }
        }
    }
    diagnostics.sort_by_key(|d| (d.start, d.code));

    let scope_tree = options
        .show_scopes
        .then(|| render_scope_tree(&arena, &bound, source));

    debug!(
        file = file_name,
        symbols = bound.symbols().len(),
        scopes = bound.scopes().len(),
        uses = uses.len(),
        unresolved,
        "analyzed"
    );

    Ok(FileReport {
        file: file_name.to_string(),
        source: source.to_string(),
        diagnostics,
        symbols: bound.symbols().len(),
        scopes: bound.scopes().len(),
        uses: uses.len(),
        unresolved,
        scope_tree,
    })
}

/// Read and analyse one file from disk.
pub fn analyze_file(path: &Path, options: AnalyzeOptions) -> Result<FileReport> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    analyze_source(&path.to_string_lossy(), &source, options)
}

/// Analyse every file on a dedicated pool. Reports come back in input order.
pub fn analyze_files(
    files: &[PathBuf],
    options: AnalyzeOptions,
    jobs: Option<usize>,
) -> Result<Vec<FileReport>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|index| format!("jscope-worker-{index}"))
        .build()
        .context("failed to start worker pool")?;

    pool.install(|| {
        files
            .par_iter()
            .map(|path| analyze_file(path, options))
            .collect()
    })
}

/// Discover and analyse everything named on the command line.
pub fn run(args: &CliArgs) -> Result<Vec<FileReport>> {
    let exclude = build_exclude_set(&args.exclude)?;
    let files = discover_sources(&args.paths, &exclude)?;
    debug!(count = files.len(), "discovered sources");
    analyze_files(&files, AnalyzeOptions::from_args(args), args.jobs)
}

/// Indented dump of the scope tree, one scope per line followed by the
/// names it declares.
///
/// ```text
/// type body 1:1 [f: field]
///   method or constructor body 3:5 [p: formal parameter]
///     block 3:17 [x: local variable]
/// ```
pub fn render_scope_tree(arena: &NodeArena, bound: &BoundUnit, source: &str) -> String {
    let line_map = LineMap::build(source);
    let mut out = String::new();

    let mut children: Vec<Vec<ScopeId>> = vec![Vec::new(); bound.scopes().len()];
    let mut stack: Vec<ScopeId> = Vec::new();
    for (id, scope) in bound.scopes().iter() {
        match children.get_mut(scope.parent.0 as usize) {
            Some(siblings) if scope.parent.is_some() => siblings.push(id),
            _ => stack.push(id),
        }
    }
    stack.reverse();

    while let Some(id) = stack.pop() {
        let Some(scope) = bound.scope(id) else {
            continue;
        };
        let pos = arena.get(scope.node).map_or(0, |node| node.pos);
        let position = line_map.offset_to_position(pos, source);

        for _ in 0..scope.depth {
            out.push_str("  ");
        }
        out.push_str(&format!(
            "{} {}:{}",
            scope.kind.name(),
            position.line + 1,
            position.character + 1
        ));

        let names: Vec<String> = scope
            .table
            .iter()
            .filter_map(|(name, entry)| {
                let symbol = bound.symbol(entry.symbol)?;
                Some(format!("{name}: {}", symbol.kind.name()))
            })
            .collect();
        if !names.is_empty() {
            out.push_str(&format!(" [{}]", names.join(", ")));
        }
        out.push('\n');

        if let Some(nested) = children.get(id.0 as usize) {
            stack.extend(nested.iter().rev().copied());
        }
    }

    out
}

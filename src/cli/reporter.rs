use colored::Colorize;
use std::collections::HashMap;
use std::path::Path;

use jscope_common::{Diagnostic, DiagnosticCategory, LineMap};
use jscope_common::diagnostics::DiagnosticRelatedInformation;

use crate::cli::driver::FileReport;

pub struct Reporter {
    color: bool,
    sources: HashMap<String, String>,
    line_maps: HashMap<String, LineMap>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: HashMap::new(),
            line_maps: HashMap::new(),
        }
    }

    /// Register source text so snippets do not need to re-read the file.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        let file = file.into();
        self.line_maps.remove(&file);
        self.sources.insert(file, text.into());
    }

    /// Human-readable output for a whole run: scope trees first, then
    /// diagnostics, then a one-line summary.
    pub fn render_reports(&mut self, reports: &[FileReport]) -> String {
        let mut out = String::new();
        let mut diagnostics = Vec::new();

        for report in reports {
            self.add_source(report.file.clone(), report.source.clone());
            if let Some(tree) = &report.scope_tree {
                out.push_str(&self.format_heading(&report.file));
                out.push('\n');
                out.push_str(tree);
                out.push('\n');
            }
            diagnostics.extend(report.diagnostics.iter().cloned());
        }

        let rendered = self.render(&diagnostics);
        if !rendered.is_empty() {
            out.push_str(&rendered);
            out.push_str("\n\n");
        }
        out.push_str(&self.format_summary(reports));
        out
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let location = self.format_location(&diagnostic.file, diagnostic.start);
        let category = self.format_category(diagnostic.category);
        let code = self.format_code(diagnostic.code);

        let mut output = String::new();
        if let Some(location) = location {
            output.push_str(&location);
        } else if !diagnostic.file.is_empty() {
            output.push_str(&diagnostic.file);
        } else {
            output.push_str("<unknown>");
        }

        output.push_str(" - ");
        output.push_str(&category);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }

        for related in &diagnostic.related_information {
            output.push('\n');
            output.push_str(&self.format_related(related));
            if let Some(snippet) = self.format_snippet(&related.file, related.start, related.length)
            {
                output.push_str(&snippet);
            }
        }

        output
    }

    /// Source line with the span underlined:
    ///
    /// ```text
    ///     4           int l = k + l;
    ///                             ~
    /// ```
    fn format_snippet(&mut self, file: &str, start: u32, length: u32) -> Option<String> {
        if file.is_empty() || length == 0 {
            return None;
        }

        let (line_num, column) = self.position_for(file, start)?;
        let (end_line, end_column) = self.position_for(file, start + length)?;
        let source = self.sources.get(file)?;
        let line_map = self.line_maps.get(file)?;
        let line_text = line_map.line_text(line_num - 1, source);

        // Spans running past the end of the line are cut at the line end.
        let span_end = if end_line == line_num {
            end_column
        } else {
            line_text.chars().count() as u32 + 1
        };

        let mut underline = String::new();
        for (i, ch) in line_text.chars().enumerate() {
            let col = i as u32 + 1;
            if col >= span_end {
                break;
            }
            let mark = if col < column { ' ' } else { '~' };
            if ch == '\t' {
                underline.extend(std::iter::repeat_n(mark, 4));
            } else {
                underline.push(mark);
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let expanded = line_text.replace('\t', "    ");
        let underline_display = if self.color {
            underline.red().to_string()
        } else {
            underline
        };

        let mut snippet = String::new();
        snippet.push('\n');
        snippet.push_str(&format!("  {:>3}   {}", line_num, expanded));
        snippet.push('\n');
        snippet.push_str(&format!("        {}", underline_display));
        Some(snippet)
    }

    fn format_related(&mut self, related: &DiagnosticRelatedInformation) -> String {
        let location = self
            .format_location(&related.file, related.start)
            .unwrap_or_else(|| related.file.clone());
        let prefix = if self.color {
            "  Related".dimmed().to_string()
        } else {
            "  Related".to_string()
        };

        format!("{}: {} - {}", prefix, location, related.message_text)
    }

    fn format_location(&mut self, file: &str, offset: u32) -> Option<String> {
        if file.is_empty() {
            return None;
        }

        let (line, column) = self.position_for(file, offset)?;
        Some(format!("{}:{}:{}", file, line, column))
    }

    /// One-based line and column of `offset`.
    fn position_for(&mut self, file: &str, offset: u32) -> Option<(u32, u32)> {
        self.ensure_source(file)?;
        if !self.line_maps.contains_key(file) {
            let source = self.sources.get(file)?;
            let map = LineMap::build(source);
            self.line_maps.insert(file.to_string(), map);
        }

        let source = self.sources.get(file)?;
        let line_map = self.line_maps.get(file)?;
        let position = line_map.offset_to_position(offset, source);
        Some((position.line + 1, position.character + 1))
    }

    fn ensure_source(&mut self, file: &str) -> Option<()> {
        if !self.sources.contains_key(file) {
            let contents = std::fs::read_to_string(Path::new(file)).ok()?;
            self.sources.insert(file.to_string(), contents);
        }
        Some(())
    }

    fn format_heading(&self, file: &str) -> String {
        if self.color {
            file.bold().underline().to_string()
        } else {
            file.to_string()
        }
    }

    fn format_summary(&self, reports: &[FileReport]) -> String {
        let errors: usize = reports
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.is_error())
            .count();
        let warnings: usize = reports
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.category == DiagnosticCategory::Warning)
            .count();
        let uses: usize = reports.iter().map(|r| r.uses).sum();
        let unresolved: usize = reports.iter().map(|r| r.unresolved).sum();

        let files = if reports.len() == 1 { "file" } else { "files" };
        let summary = format!(
            "{} {files}, {uses} name uses, {unresolved} unresolved, {errors} errors, {warnings} warnings",
            reports.len()
        );
        if self.color && errors > 0 {
            summary.red().to_string()
        } else {
            summary
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.name();

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("JS{}", code);
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    files: &'a [FileReport],
}

/// Machine-readable output for a whole run.
pub fn render_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput { files: reports })
}

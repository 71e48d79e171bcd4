use jscope_common::{Diagnostic, diagnostic_codes};

use super::driver::{AnalyzeOptions, analyze_source};
use super::reporter::{Reporter, render_json};

const SOURCE: &str = "class C {\n    void m() { y = 1; }\n}\n";

fn unresolved_y() -> Diagnostic {
    let start = SOURCE.find("y = 1").unwrap() as u32;
    Diagnostic::from_code("A.java", start, 1, diagnostic_codes::UNRESOLVED_NAME, &["y"])
}

#[test]
fn formats_location_category_and_code() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.java", SOURCE);

    let output = reporter.format_diagnostic(&unresolved_y());
    let first_line = output.lines().next().unwrap();
    assert_eq!(
        first_line,
        "A.java:2:16 - warning JS2002: Cannot resolve name 'y' to a variable or field."
    );
}

#[test]
fn underlines_the_span_in_a_snippet() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.java", SOURCE);

    let output = reporter.format_diagnostic(&unresolved_y());
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3, "{output}");
    assert_eq!(lines[1], "    2       void m() { y = 1; }");
    assert_eq!(lines[2], format!("        {}~", " ".repeat(15)));
}

#[test]
fn renders_related_information() {
    let source = "class C { int a; int a; }";
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.java", source);

    let diagnostic = Diagnostic::from_code(
        "A.java",
        source.rfind('a').unwrap() as u32,
        1,
        diagnostic_codes::DUPLICATE_DECLARATION,
        &["a"],
    )
    .with_related("A.java", 14, 1, "'a' was first declared here.");

    let output = reporter.format_diagnostic(&diagnostic);
    assert!(output.starts_with("A.java:1:22 - error JS2001: Duplicate declaration of 'a' in the same scope."));
    assert!(
        output.contains("  Related: A.java:1:15 - 'a' was first declared here."),
        "{output}"
    );
}

#[test]
fn unknown_file_without_source_falls_back_to_its_name() {
    let mut reporter = Reporter::new(false);
    let diagnostic = Diagnostic::error("missing/Nowhere.java", 3, 1, "boom", 1001);
    let output = reporter.format_diagnostic(&diagnostic);
    assert_eq!(output, "missing/Nowhere.java - error JS1001: boom");
}

#[test]
fn render_reports_ends_with_a_summary() {
    let report = analyze_source("A.java", SOURCE, AnalyzeOptions::default()).unwrap();
    let output = Reporter::new(false).render_reports(&[report]);

    assert!(output.starts_with("A.java:2:16 - warning JS2002"), "{output}");
    assert!(
        output.ends_with("1 file, 1 name uses, 1 unresolved, 0 errors, 1 warnings"),
        "{output}"
    );
}

#[test]
fn render_reports_prints_scope_trees_under_a_heading() {
    let options = AnalyzeOptions {
        show_scopes: true,
        ..AnalyzeOptions::default()
    };
    let report = analyze_source("A.java", "class C { int f; }", options).unwrap();
    let output = Reporter::new(false).render_reports(&[report]);

    assert!(output.starts_with("A.java\ntype body 1:1 [f: field]\n"), "{output}");
    assert!(output.ends_with("1 file, 0 name uses, 0 unresolved, 0 errors, 0 warnings"));
}

#[test]
fn json_output_lists_files_and_diagnostics() {
    let report = analyze_source("A.java", SOURCE, AnalyzeOptions::default()).unwrap();
    let json = render_json(&[report]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let file = &value["files"][0];
    assert_eq!(file["file"], "A.java");
    assert_eq!(file["uses"], 1);
    assert_eq!(file["unresolved"], 1);
    assert_eq!(file["diagnostics"][0]["code"], diagnostic_codes::UNRESOLVED_NAME);
    assert_eq!(file["diagnostics"][0]["category"], "warning");
    assert!(file.get("source").is_none(), "source text is not serialized");
    assert!(file.get("scope_tree").is_none());
}

//! Tests for the token stream produced by `ScannerState`.

use jscope_scanner::{ScannerState, SyntaxKind};

fn kinds(source: &str) -> Vec<SyntaxKind> {
    ScannerState::new("Test.java", source)
        .scan_all()
        .tokens
        .iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_scans_local_declaration() {
    assert_eq!(
        kinds("int k = 0, l = k + l;"),
        vec![
            SyntaxKind::IntKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::NumericLiteral,
            SyntaxKind::CommaToken,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::PlusToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_comments_and_whitespace_are_skipped() {
    let source = "// line\n/* block\n comment */ x /** doc */";
    assert_eq!(
        kinds(source),
        vec![SyntaxKind::Identifier, SyntaxKind::EndOfFileToken]
    );
}

#[test]
fn test_greater_than_is_never_merged_into_shift() {
    assert_eq!(
        kinds("Map<String, List<T>> m"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::CommaToken,
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_contextual_keywords_are_identifiers() {
    assert_eq!(
        kinds("record var yield"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_literals() {
    let source = r#"0x1F 1_000L 3.14e-2f "s\"q" 'c' """
text "block"
""""#;
    assert_eq!(
        kinds(source),
        vec![
            SyntaxKind::NumericLiteral,
            SyntaxKind::NumericLiteral,
            SyntaxKind::NumericLiteral,
            SyntaxKind::StringLiteral,
            SyntaxKind::CharacterLiteral,
            SyntaxKind::TextBlockLiteral,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_token_ranges_cover_source_text() {
    let source = "try (Reader r = open()) {}";
    let result = ScannerState::new("Test.java", source).scan_all();
    let texts: Vec<&str> = result.tokens.iter().map(|t| t.text(source)).collect();
    assert_eq!(
        texts,
        vec!["try", "(", "Reader", "r", "=", "open", "(", ")", ")", "{", "}", ""]
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_unterminated_string_reports_diagnostic() {
    let result = ScannerState::new("Test.java", "\"abc\nx").scan_all();
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, 1003);
    assert_eq!(result.tokens.last().map(|t| t.kind), Some(SyntaxKind::EndOfFileToken));
}

#[test]
fn test_arrow_and_method_reference_tokens() {
    assert_eq!(
        kinds("x -> String::valueOf"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::ArrowToken,
            SyntaxKind::Identifier,
            SyntaxKind::ColonColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

//! Token kinds.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,

    // Literals and names
    Identifier,
    NumericLiteral,
    StringLiteral,
    CharacterLiteral,
    TextBlockLiteral,

    // Punctuation
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    DotToken,
    DotDotDotToken,
    AtToken,
    ColonColonToken,
    ColonToken,
    QuestionToken,
    ArrowToken,

    // Operators. `>` is always scanned alone so that nested type arguments
    // close cleanly; the parser joins adjacent `>` tokens into shifts.
    EqualsToken,
    GreaterThanToken,
    GreaterThanEqualsToken,
    LessThanToken,
    LessThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    PlusPlusToken,
    MinusMinusToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    LessThanLessThanToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    LessThanLessThanEqualsToken,

    // Reserved words
    AbstractKeyword,
    AssertKeyword,
    BooleanKeyword,
    BreakKeyword,
    ByteKeyword,
    CaseKeyword,
    CatchKeyword,
    CharKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DefaultKeyword,
    DoKeyword,
    DoubleKeyword,
    ElseKeyword,
    EnumKeyword,
    ExtendsKeyword,
    FinalKeyword,
    FinallyKeyword,
    FloatKeyword,
    ForKeyword,
    GotoKeyword,
    IfKeyword,
    ImplementsKeyword,
    ImportKeyword,
    InstanceOfKeyword,
    IntKeyword,
    InterfaceKeyword,
    LongKeyword,
    NativeKeyword,
    NewKeyword,
    PackageKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReturnKeyword,
    ShortKeyword,
    StaticKeyword,
    StrictFpKeyword,
    SuperKeyword,
    SwitchKeyword,
    SynchronizedKeyword,
    ThisKeyword,
    ThrowKeyword,
    ThrowsKeyword,
    TransientKeyword,
    TryKeyword,
    VoidKeyword,
    VolatileKeyword,
    WhileKeyword,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
}

impl SyntaxKind {
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AbstractKeyword as u16)
    }

    /// Primitive type keywords (`void` included, it is parsed in the same places).
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BooleanKeyword
                | SyntaxKind::ByteKeyword
                | SyntaxKind::CharKeyword
                | SyntaxKind::ShortKeyword
                | SyntaxKind::IntKeyword
                | SyntaxKind::LongKeyword
                | SyntaxKind::FloatKeyword
                | SyntaxKind::DoubleKeyword
                | SyntaxKind::VoidKeyword
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::NumericLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::CharacterLiteral
                | SyntaxKind::TextBlockLiteral
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::NullKeyword
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsToken
                | SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
                | SyntaxKind::PercentEqualsToken
                | SyntaxKind::AmpersandEqualsToken
                | SyntaxKind::BarEqualsToken
                | SyntaxKind::CaretEqualsToken
                | SyntaxKind::LessThanLessThanEqualsToken
        )
    }

    /// Fixed spelling of punctuation and keywords, used in diagnostics.
    pub fn text(self) -> &'static str {
        match self {
            SyntaxKind::Unknown => "<unknown>",
            SyntaxKind::EndOfFileToken => "<end of file>",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::NumericLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::CharacterLiteral => "character",
            SyntaxKind::TextBlockLiteral => "text block",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::DotToken => ".",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::AtToken => "@",
            SyntaxKind::ColonColonToken => "::",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::ArrowToken => "->",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::LessThanLessThanToken => "<<",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::PercentEqualsToken => "%=",
            SyntaxKind::AmpersandEqualsToken => "&=",
            SyntaxKind::BarEqualsToken => "|=",
            SyntaxKind::CaretEqualsToken => "^=",
            SyntaxKind::LessThanLessThanEqualsToken => "<<=",
            SyntaxKind::AbstractKeyword => "abstract",
            SyntaxKind::AssertKeyword => "assert",
            SyntaxKind::BooleanKeyword => "boolean",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::ByteKeyword => "byte",
            SyntaxKind::CaseKeyword => "case",
            SyntaxKind::CatchKeyword => "catch",
            SyntaxKind::CharKeyword => "char",
            SyntaxKind::ClassKeyword => "class",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::DefaultKeyword => "default",
            SyntaxKind::DoKeyword => "do",
            SyntaxKind::DoubleKeyword => "double",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::EnumKeyword => "enum",
            SyntaxKind::ExtendsKeyword => "extends",
            SyntaxKind::FinalKeyword => "final",
            SyntaxKind::FinallyKeyword => "finally",
            SyntaxKind::FloatKeyword => "float",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::GotoKeyword => "goto",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ImplementsKeyword => "implements",
            SyntaxKind::ImportKeyword => "import",
            SyntaxKind::InstanceOfKeyword => "instanceof",
            SyntaxKind::IntKeyword => "int",
            SyntaxKind::InterfaceKeyword => "interface",
            SyntaxKind::LongKeyword => "long",
            SyntaxKind::NativeKeyword => "native",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::PackageKeyword => "package",
            SyntaxKind::PrivateKeyword => "private",
            SyntaxKind::ProtectedKeyword => "protected",
            SyntaxKind::PublicKeyword => "public",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::ShortKeyword => "short",
            SyntaxKind::StaticKeyword => "static",
            SyntaxKind::StrictFpKeyword => "strictfp",
            SyntaxKind::SuperKeyword => "super",
            SyntaxKind::SwitchKeyword => "switch",
            SyntaxKind::SynchronizedKeyword => "synchronized",
            SyntaxKind::ThisKeyword => "this",
            SyntaxKind::ThrowKeyword => "throw",
            SyntaxKind::ThrowsKeyword => "throws",
            SyntaxKind::TransientKeyword => "transient",
            SyntaxKind::TryKeyword => "try",
            SyntaxKind::VoidKeyword => "void",
            SyntaxKind::VolatileKeyword => "volatile",
            SyntaxKind::WhileKeyword => "while",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::NullKeyword => "null",
        }
    }
}

/// Map reserved-word text to its keyword kind.
///
/// Contextual keywords (`var`, `record`, `yield`, `sealed`, `permits`) are
/// scanned as identifiers; the parser checks their text where they matter.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    let kind = match text {
        "abstract" => SyntaxKind::AbstractKeyword,
        "assert" => SyntaxKind::AssertKeyword,
        "boolean" => SyntaxKind::BooleanKeyword,
        "break" => SyntaxKind::BreakKeyword,
        "byte" => SyntaxKind::ByteKeyword,
        "case" => SyntaxKind::CaseKeyword,
        "catch" => SyntaxKind::CatchKeyword,
        "char" => SyntaxKind::CharKeyword,
        "class" => SyntaxKind::ClassKeyword,
        "const" => SyntaxKind::ConstKeyword,
        "continue" => SyntaxKind::ContinueKeyword,
        "default" => SyntaxKind::DefaultKeyword,
        "do" => SyntaxKind::DoKeyword,
        "double" => SyntaxKind::DoubleKeyword,
        "else" => SyntaxKind::ElseKeyword,
        "enum" => SyntaxKind::EnumKeyword,
        "extends" => SyntaxKind::ExtendsKeyword,
        "final" => SyntaxKind::FinalKeyword,
        "finally" => SyntaxKind::FinallyKeyword,
        "float" => SyntaxKind::FloatKeyword,
        "for" => SyntaxKind::ForKeyword,
        "goto" => SyntaxKind::GotoKeyword,
        "if" => SyntaxKind::IfKeyword,
        "implements" => SyntaxKind::ImplementsKeyword,
        "import" => SyntaxKind::ImportKeyword,
        "instanceof" => SyntaxKind::InstanceOfKeyword,
        "int" => SyntaxKind::IntKeyword,
        "interface" => SyntaxKind::InterfaceKeyword,
        "long" => SyntaxKind::LongKeyword,
        "native" => SyntaxKind::NativeKeyword,
        "new" => SyntaxKind::NewKeyword,
        "package" => SyntaxKind::PackageKeyword,
        "private" => SyntaxKind::PrivateKeyword,
        "protected" => SyntaxKind::ProtectedKeyword,
        "public" => SyntaxKind::PublicKeyword,
        "return" => SyntaxKind::ReturnKeyword,
        "short" => SyntaxKind::ShortKeyword,
        "static" => SyntaxKind::StaticKeyword,
        "strictfp" => SyntaxKind::StrictFpKeyword,
        "super" => SyntaxKind::SuperKeyword,
        "switch" => SyntaxKind::SwitchKeyword,
        "synchronized" => SyntaxKind::SynchronizedKeyword,
        "this" => SyntaxKind::ThisKeyword,
        "throw" => SyntaxKind::ThrowKeyword,
        "throws" => SyntaxKind::ThrowsKeyword,
        "transient" => SyntaxKind::TransientKeyword,
        "try" => SyntaxKind::TryKeyword,
        "void" => SyntaxKind::VoidKeyword,
        "volatile" => SyntaxKind::VolatileKeyword,
        "while" => SyntaxKind::WhileKeyword,
        "true" => SyntaxKind::TrueKeyword,
        "false" => SyntaxKind::FalseKeyword,
        "null" => SyntaxKind::NullKeyword,
        _ => return None,
    };
    Some(kind)
}

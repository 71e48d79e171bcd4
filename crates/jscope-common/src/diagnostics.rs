//! Diagnostic types and message lookup shared by the parser, binder and CLI.
//!
//! Codes are stable: tooling keys off the numeric value, not the text.
//! Templates use `{0}`, `{1}`, ... placeholders filled by [`format_message`].

use serde::Serialize;
use std::fmt;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Related information for a diagnostic (e.g. where the first declaration lives).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A diagnostic message with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g. the declaration that won a collision)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic whose category and text come from the message table.
    ///
    /// Unknown codes fall back to an error with the bare argument list.
    #[must_use]
    pub fn from_code(file: impl Into<String>, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let (category, message_text) = match get_diagnostic_message(code) {
            Some(msg) => (msg.category, format_message(msg.message, args)),
            None => (DiagnosticCategory::Error, args.join(" ")),
        };
        Self {
            file: file.into(),
            start,
            length,
            message_text,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(
        mut self,
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

// =============================================================================
// Message table
// =============================================================================

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNEXPECTED_TOKEN: u32 = 1001;
    pub const EXPECTED_TOKEN: u32 = 1002;
    pub const UNTERMINATED_LITERAL: u32 = 1003;
    pub const UNSUPPORTED_SYNTAX: u32 = 1004;
    pub const DUPLICATE_DECLARATION: u32 = 2001;
    pub const UNRESOLVED_NAME: u32 = 2002;
    pub const SELF_REFERENCE_IN_INITIALIZER: u32 = 2003;
}

pub const DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::UNEXPECTED_TOKEN,
        category: DiagnosticCategory::Error,
        message: "Unexpected token '{0}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXPECTED_TOKEN,
        category: DiagnosticCategory::Error,
        message: "'{0}' expected, found '{1}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNTERMINATED_LITERAL,
        category: DiagnosticCategory::Error,
        message: "Unterminated {0} literal.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_SYNTAX,
        category: DiagnosticCategory::Error,
        message: "{0} is not supported.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_DECLARATION,
        category: DiagnosticCategory::Error,
        message: "Duplicate declaration of '{0}' in the same scope.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_NAME,
        category: DiagnosticCategory::Warning,
        message: "Cannot resolve name '{0}' to a variable or field.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::SELF_REFERENCE_IN_INITIALIZER,
        category: DiagnosticCategory::Warning,
        message: "Variable '{0}' is referenced in its own initializer.",
    },
];

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

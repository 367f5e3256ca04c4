//! Uniform diagnostic records shared by every phase.
//!
//! A [`DiagnosticBag`] belongs to exactly one compilation unit. Phases only ever
//! append to it; records are never edited after they are pushed.

use serde::{Deserialize, Serialize};

use crate::span::Span;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const LEX_UNTERMINATED_STRING: &str = "LEX001";
pub const LEX_UNTERMINATED_TEMPLATE: &str = "LEX002";
pub const LEX_INVALID_CHARACTER: &str = "LEX003";
pub const LEX_UNTERMINATED_ELEMENT: &str = "LEX004";
pub const LEX_UNTERMINATED_COMMENT: &str = "LEX005";
pub const LEX_UNTERMINATED_REGEX: &str = "LEX006";
pub const LEX_ITERATION_CAP: &str = "LEX007";

pub const PARSE_UNEXPECTED_TOKEN: &str = "PARSE001";
pub const PARSE_EXPECTED_TOKEN: &str = "PARSE002";
pub const PARSE_MISMATCHED_TAG: &str = "PARSE003";
pub const PARSE_INVALID_TARGET: &str = "PARSE004";

pub const SEM_UNDECLARED_VARIABLE: &str = "SEM001";
pub const SEM_DUPLICATE_DECLARATION: &str = "SEM002";
pub const SEM_UNUSED_VARIABLE: &str = "SEM003";
pub const SEM_UNUSED_IMPORT: &str = "SEM004";
pub const SEM_UNDECLARED_COMPONENT: &str = "SEM005";
pub const SEM_MISSING_DEPENDENCY: &str = "SEM006";
pub const SEM_UNNECESSARY_DEPENDENCY: &str = "SEM007";
pub const SEM_MISSING_DEPENDENCY_ARRAY: &str = "SEM008";

pub const EMIT_UNSUPPORTED: &str = "EMIT001";

/// One-line statement of what a diagnostic code protects.
pub fn describe(code: &str) -> &'static str {
    match code {
        LEX_UNTERMINATED_STRING => "String literals end on the line they start.",
        LEX_UNTERMINATED_TEMPLATE => "Template literals are closed by a matching backtick.",
        LEX_INVALID_CHARACTER => "Source text only contains characters the dialect defines.",
        LEX_UNTERMINATED_ELEMENT => "Every markup element is closed before end of input.",
        LEX_UNTERMINATED_COMMENT => "Block comments are closed before end of input.",
        LEX_UNTERMINATED_REGEX => "Regular expression literals end on the line they start.",
        LEX_ITERATION_CAP => "Tokenization always terminates with a bounded token stream.",
        PARSE_UNEXPECTED_TOKEN => "Every token belongs to a grammar production.",
        PARSE_EXPECTED_TOKEN => "Productions are complete.",
        PARSE_MISMATCHED_TAG => "Closing tags name the element they close.",
        PARSE_INVALID_TARGET => "Assignments and bindings target patterns.",
        SEM_UNDECLARED_VARIABLE => "Every referenced identifier is declared or global.",
        SEM_DUPLICATE_DECLARATION => "A name is declared at most once per scope.",
        SEM_UNUSED_VARIABLE => "Declared variables are read.",
        SEM_UNUSED_IMPORT => "Imported bindings are read.",
        SEM_UNDECLARED_COMPONENT => "Capitalized tags resolve to a declared or imported component.",
        SEM_MISSING_DEPENDENCY => "Effect dependency lists name every reactive value read.",
        SEM_UNNECESSARY_DEPENDENCY => "Effect dependency lists only name values that are read.",
        SEM_MISSING_DEPENDENCY_ARRAY => "Effects reading reactive values declare a dependency list.",
        EMIT_UNSUPPORTED => "Every IR construct has an emission rule.",
        _ => "Unknown diagnostic.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lexer,
    Parser,
    Semantic,
    Lowering,
    Transform,
    Emitter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub location: Span,
    pub phase: Phase,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: &str, message: impl Into<String>, location: Span, phase: Phase) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
            location,
            phase,
            suggestion: None,
            hints: vec![],
        }
    }

    pub fn error(code: &str, message: impl Into<String>, location: Span, phase: Phase) -> Self {
        Self::new(Severity::Error, code, message, location, phase)
    }

    pub fn warning(code: &str, message: impl Into<String>, location: Span, phase: Phase) -> Self {
        Self::new(Severity::Warning, code, message, location, phase)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Append-only diagnostics for one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// External, 1-based form handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi_derive::napi(object))]
#[serde(rename_all = "camelCase")]
pub struct PublicDiagnostic {
    pub severity: String,
    pub code: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub suggestion: Option<String>,
}

impl From<&Diagnostic> for PublicDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        let severity = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        PublicDiagnostic {
            severity: severity.to_string(),
            code: d.code.clone(),
            message: d.message.clone(),
            line: d.location.line.max(1),
            column: d.location.column.max(1),
            suggestion: d.suggestion.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_is_append_only_and_counts_errors() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.has_errors());
        bag.push(Diagnostic::warning(SEM_UNUSED_VARIABLE, "unused", Span::default(), Phase::Semantic));
        assert!(!bag.has_errors());
        bag.push(Diagnostic::error(SEM_UNDECLARED_VARIABLE, "undeclared", Span::default(), Phase::Semantic));
        assert!(bag.has_errors());
        assert_eq!(bag.with_code(SEM_UNUSED_VARIABLE).count(), 1);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_public_form_is_one_based() {
        let d = Diagnostic::error(PARSE_UNEXPECTED_TOKEN, "boom", Span::default(), Phase::Parser)
            .with_suggestion("remove it");
        let public = PublicDiagnostic::from(&d);
        assert_eq!(public.line, 1);
        assert_eq!(public.column, 1);
        assert_eq!(public.severity, "error");
        assert_eq!(public.suggestion.as_deref(), Some("remove it"));
    }

    #[test]
    fn test_every_code_is_described() {
        for code in [LEX_UNTERMINATED_STRING, PARSE_MISMATCHED_TAG, SEM_MISSING_DEPENDENCY_ARRAY, EMIT_UNSUPPORTED] {
            assert_ne!(describe(code), "Unknown diagnostic.");
        }
    }
}

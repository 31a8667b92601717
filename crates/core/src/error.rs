use crate::ast::Provenance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error identifiers. Callers match on these, not on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidLine,
    InvalidUri,
    InvalidInput,
    MissingLabelledValue,
    InvalidCompositeEntity,
    SynonymsNotAList,
    InvalidRegexEntity,
    DuplicateEntityDefinition,
    RoleNameCollision,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidLine => "InvalidLine",
            ErrorCode::InvalidUri => "InvalidUri",
            ErrorCode::InvalidInput => "InvalidInput",
            ErrorCode::MissingLabelledValue => "MissingLabelledValue",
            ErrorCode::InvalidCompositeEntity => "InvalidCompositeEntity",
            ErrorCode::SynonymsNotAList => "SynonymsNotAList",
            ErrorCode::InvalidRegexEntity => "InvalidRegexEntity",
            ErrorCode::DuplicateEntityDefinition => "DuplicateEntityDefinition",
            ErrorCode::RoleNameCollision => "RoleNameCollision",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal parse error. Aborts processing of the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{file}:{line}: {message}")]
pub struct LuError {
    pub code: ErrorCode,
    pub file: String,
    pub line: u32,
    pub message: String,
    /// The offending source line, when one is known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context: Option<String>,
    /// Front-end findings folded into this error.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl LuError {
    pub fn new(code: ErrorCode, file: &str, line: u32, message: impl Into<String>) -> Self {
        LuError {
            code,
            file: file.to_owned(),
            line,
            message: message.into(),
            context: None,
            diagnostics: Vec::new(),
        }
    }

    /// Error located at a declaration, carrying its source text as context.
    pub fn at(code: ErrorCode, prov: &Provenance, message: impl Into<String>) -> Self {
        LuError {
            context: Some(prov.text.clone()),
            ..LuError::new(code, &prov.file, prov.line, message)
        }
    }

    /// Fold the front end's error diagnostics into one `InvalidLine` error.
    pub fn from_diagnostics(file: &str, diagnostics: Vec<Diagnostic>) -> Self {
        let line = diagnostics.first().map_or(0, |d| d.line);
        let message = diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        LuError {
            diagnostics,
            ..LuError::new(ErrorCode::InvalidLine, file, line, message)
        }
    }

    /// `"<line>: <message>"` followed by the offending source line.
    /// Folded front-end errors are already one per line.
    pub fn render(&self) -> String {
        if !self.diagnostics.is_empty() {
            return self.message.clone();
        }
        match &self.context {
            Some(text) => format!("{}: {}\n    {}", self.line, self.message, text.trim()),
            None => format!("{}: {}", self.line, self.message),
        }
    }

    /// Serialize with every field present (null for missing ones).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "code":    self.code,
            "context": self.context,
            "file":    self.file,
            "line":    self.line,
            "message": self.message,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warn,
    Error,
}

/// A finding reported by the front end or by a non-fatal skip in a later
/// pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn warn(code: ErrorCode, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warn,
            code,
            line,
            message: message.into(),
        }
    }

    pub fn error(code: ErrorCode, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            line,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.message)
    }
}

/// Collects non-fatal findings for the caller, logging each one when
/// verbose.
#[derive(Debug, Default)]
pub struct Warnings {
    verbose: bool,
    items: Vec<Diagnostic>,
}

impl Warnings {
    pub fn new(verbose: bool) -> Self {
        Warnings {
            verbose,
            items: Vec::new(),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.verbose {
            tracing::warn!(
                line = diagnostic.line,
                code = %diagnostic.code,
                "{}",
                diagnostic.message
            );
        }
        self.items.push(diagnostic);
    }

    pub fn warn(&mut self, code: ErrorCode, line: u32, message: impl Into<String>) {
        self.push(Diagnostic::warn(code, line, message));
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_are_collected_even_when_quiet() {
        let mut w = Warnings::new(false);
        w.warn(ErrorCode::InvalidInput, 2, "skipped");
        let items = w.into_vec();
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_error());
    }

    #[test]
    fn display_includes_file_and_line() {
        let e = LuError::new(ErrorCode::InvalidInput, "a.lu", 7, "bad thing");
        assert_eq!(e.to_string(), "a.lu:7: bad thing");
    }

    #[test]
    fn render_appends_source_context() {
        let prov = Provenance {
            file: "a.lu".into(),
            line: 3,
            text: "  @ phraselist pl hasRoles r  ".into(),
        };
        let e = LuError::at(ErrorCode::InvalidInput, &prov, "roles not allowed");
        assert_eq!(
            e.render(),
            "3: roles not allowed\n    @ phraselist pl hasRoles r"
        );
    }

    #[test]
    fn folded_diagnostics_keep_first_line() {
        let e = LuError::from_diagnostics(
            "a.lu",
            vec![
                Diagnostic::error(ErrorCode::InvalidLine, 4, "unbalanced '{'"),
                Diagnostic::error(ErrorCode::InvalidLine, 9, "unexpected line"),
            ],
        );
        assert_eq!(e.code, ErrorCode::InvalidLine);
        assert_eq!(e.line, 4);
        assert_eq!(e.message, "4: unbalanced '{'\n9: unexpected line");
        assert_eq!(e.diagnostics.len(), 2);
        assert_eq!(e.render(), e.message);
    }

    #[test]
    fn json_value_has_all_fields() {
        let e = LuError::new(ErrorCode::InvalidUri, "kb.qna", 1, "HEAD failed");
        let v = e.to_json_value();
        assert_eq!(v["code"], "InvalidUri");
        assert!(v["context"].is_null());
        assert_eq!(v["line"], 1);
    }
}

//! Syntax resource types produced by the front end.
//!
//! Sections are kept in source order; later passes depend on that order
//! because each merge decision reads registry state built by earlier lines.

use crate::error::Diagnostic;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
    /// Raw source line, used as diagnostic context.
    pub text: String,
}

// ──────────────────────────────────────────────
// Syntax resource
// ──────────────────────────────────────────────

/// Everything the front end recognized in one file.
#[derive(Debug, Clone, Default)]
pub struct SyntaxResource {
    pub sections: Vec<Section>,
    /// Warnings and errors found while parsing. Any error aborts the file
    /// before semantic processing starts.
    pub diagnostics: Vec<Diagnostic>,
}

impl SyntaxResource {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Debug, Clone)]
pub enum Section {
    ModelInfo(ModelInfoLine),
    Import(ImportSection),
    Intent(IntentSection),
    NewEntity(NewEntitySection),
    LegacyEntity(LegacyEntitySection),
    Qna(QnaSection),
}

impl Section {
    pub fn prov(&self) -> &Provenance {
        match self {
            Section::ModelInfo(s) => &s.prov,
            Section::Import(s) => &s.prov,
            Section::Intent(s) => &s.prov,
            Section::NewEntity(s) => &s.prov,
            Section::LegacyEntity(s) => &s.prov,
            Section::Qna(s) => &s.prov,
        }
    }
}

/// `> !# @scope.key = value`; `directive` is everything after `!#`.
#[derive(Debug, Clone)]
pub struct ModelInfoLine {
    pub directive: String,
    pub prov: Provenance,
}

/// `[description](path)`
#[derive(Debug, Clone)]
pub struct ImportSection {
    pub description: String,
    pub path: String,
    pub prov: Provenance,
}

#[derive(Debug, Clone)]
pub struct IntentSection {
    pub name: String,
    pub utterances: Vec<UtteranceLine>,
    pub prov: Provenance,
}

#[derive(Debug, Clone)]
pub struct UtteranceLine {
    pub nodes: Vec<UtteranceNode>,
    pub prov: Provenance,
}

/// One node of an utterance's span tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UtteranceNode {
    Text(String),
    Label(LabelNode),
}

/// `{entity}`, `{entity:role}`, `{@name}` or `{entity=value}` where the
/// value may itself contain labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelNode {
    pub entity: String,
    pub role: Option<String>,
    /// Written as `{@name}`: `name` may be an entity or a role.
    pub at_reference: bool,
    /// `None` for value-less placeholders.
    pub value: Option<Vec<UtteranceNode>>,
}

/// A bullet line belonging to an entity body.
#[derive(Debug, Clone)]
pub struct BodyLine {
    pub text: String,
    pub prov: Provenance,
}

/// Text after `=` plus any bullet lines that followed the declaration.
#[derive(Debug, Clone, Default)]
pub struct EntityDefinition {
    pub inline: String,
    pub lines: Vec<BodyLine>,
}

/// `@ <type> <name>[(interchangeable)] [hasRoles] <roles> [= <definition>]`
#[derive(Debug, Clone)]
pub struct NewEntitySection {
    pub entity_type: String,
    pub name: String,
    pub roles: Vec<String>,
    pub interchangeable: bool,
    pub definition: Option<EntityDefinition>,
    pub prov: Provenance,
}

/// `$<name>:<type string>` followed by optional body lines.
#[derive(Debug, Clone)]
pub struct LegacyEntitySection {
    pub name: String,
    pub type_string: String,
    pub lines: Vec<BodyLine>,
    pub prov: Provenance,
}

#[derive(Debug, Clone)]
pub struct QnaSection {
    pub questions: Vec<String>,
    pub filters: Vec<(String, String)>,
    pub answer: String,
    pub prov: Provenance,
}

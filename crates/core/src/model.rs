//! The consolidated model: entity records, intents, utterances, patterns
//! and the QnA knowledge base.

use crate::error::Diagnostic;
use crate::registry::EntityRegistry;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fmt;

// ──────────────────────────────────────────────
// Entities
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Simple,
    List,
    Composite,
    Regex,
    Prebuilt,
    PatternAny,
    PhraseList,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Simple => "simple",
            EntityKind::List => "list",
            EntityKind::Composite => "composite",
            EntityKind::Regex => "regex",
            EntityKind::Prebuilt => "prebuilt",
            EntityKind::PatternAny => "pattern.any",
            EntityKind::PhraseList => "phrase list",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles of one entity. Compared as a set; iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RoleSet(Vec<String>);

impl RoleSet {
    pub fn new() -> Self {
        RoleSet(Vec::new())
    }

    /// Returns `true` if the role was not present.
    pub fn insert(&mut self, role: &str) -> bool {
        if self.contains(role) {
            return false;
        }
        self.0.push(role.to_owned());
        true
    }

    pub fn extend<'r>(&mut self, roles: impl IntoIterator<Item = &'r String>) {
        for role in roles {
            self.insert(role);
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl PartialEq for RoleSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|r| other.contains(r))
    }
}

impl Eq for RoleSet {}

impl<'r> IntoIterator for &'r RoleSet {
    type Item = &'r String;
    type IntoIter = std::slice::Iter<'r, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = RoleSet::new();
        for role in iter {
            set.insert(role.as_ref());
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubList {
    pub canonical_form: String,
    pub synonyms: Vec<String>,
}

/// Prebuilt-domain metadata from `@intent.inherits` / `@entity.inherits`.
#[derive(Debug, Clone, PartialEq)]
pub struct Inherits {
    pub domain_name: String,
    pub model_name: String,
}

static NO_ROLES: RoleSet = RoleSet(Vec::new());

/// One named entity definition.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    Simple {
        name: String,
        roles: RoleSet,
    },
    List {
        name: String,
        roles: RoleSet,
        sublists: Vec<SubList>,
    },
    Composite {
        name: String,
        roles: RoleSet,
        /// Child entity names, resolved against the registry when emitted.
        children: Vec<String>,
    },
    Regex {
        name: String,
        roles: RoleSet,
        /// Empty until a declaration supplies one.
        pattern: String,
    },
    Prebuilt {
        name: String,
        roles: RoleSet,
    },
    PatternAny {
        name: String,
        roles: RoleSet,
        explicit_list: Vec<String>,
    },
    /// Lives in its own namespace; never has roles.
    PhraseList {
        name: String,
        values: Vec<String>,
        interchangeable: bool,
    },
}

impl EntityRecord {
    /// Empty record of `kind`.
    pub fn new(kind: EntityKind, name: &str) -> Self {
        let name = name.to_owned();
        let roles = RoleSet::new();
        match kind {
            EntityKind::Simple => EntityRecord::Simple { name, roles },
            EntityKind::List => EntityRecord::List {
                name,
                roles,
                sublists: Vec::new(),
            },
            EntityKind::Composite => EntityRecord::Composite {
                name,
                roles,
                children: Vec::new(),
            },
            EntityKind::Regex => EntityRecord::Regex {
                name,
                roles,
                pattern: String::new(),
            },
            EntityKind::Prebuilt => EntityRecord::Prebuilt { name, roles },
            EntityKind::PatternAny => EntityRecord::PatternAny {
                name,
                roles,
                explicit_list: Vec::new(),
            },
            EntityKind::PhraseList => EntityRecord::PhraseList {
                name,
                values: Vec::new(),
                interchangeable: false,
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Simple { .. } => EntityKind::Simple,
            EntityRecord::List { .. } => EntityKind::List,
            EntityRecord::Composite { .. } => EntityKind::Composite,
            EntityRecord::Regex { .. } => EntityKind::Regex,
            EntityRecord::Prebuilt { .. } => EntityKind::Prebuilt,
            EntityRecord::PatternAny { .. } => EntityKind::PatternAny,
            EntityRecord::PhraseList { .. } => EntityKind::PhraseList,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityRecord::Simple { name, .. }
            | EntityRecord::List { name, .. }
            | EntityRecord::Composite { name, .. }
            | EntityRecord::Regex { name, .. }
            | EntityRecord::Prebuilt { name, .. }
            | EntityRecord::PatternAny { name, .. }
            | EntityRecord::PhraseList { name, .. } => name,
        }
    }

    pub fn roles(&self) -> &RoleSet {
        match self {
            EntityRecord::Simple { roles, .. }
            | EntityRecord::List { roles, .. }
            | EntityRecord::Composite { roles, .. }
            | EntityRecord::Regex { roles, .. }
            | EntityRecord::Prebuilt { roles, .. }
            | EntityRecord::PatternAny { roles, .. } => roles,
            EntityRecord::PhraseList { .. } => &NO_ROLES,
        }
    }

    /// `None` for phrase lists.
    pub(crate) fn roles_mut(&mut self) -> Option<&mut RoleSet> {
        match self {
            EntityRecord::Simple { roles, .. }
            | EntityRecord::List { roles, .. }
            | EntityRecord::Composite { roles, .. }
            | EntityRecord::Regex { roles, .. }
            | EntityRecord::Prebuilt { roles, .. }
            | EntityRecord::PatternAny { roles, .. } => Some(roles),
            EntityRecord::PhraseList { .. } => None,
        }
    }
}

// ──────────────────────────────────────────────
// Intents, utterances, patterns
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub name: String,
    pub inherits: Option<Inherits>,
}

/// A labelled span; `end_pos` is inclusive, offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabel {
    pub entity: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub intent: String,
    pub entities: Vec<EntityLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub pattern: String,
    pub intent: String,
}

/// The intent-recognition application being built.
#[derive(Debug, Default)]
pub struct LuisApp {
    /// `@app.*` directives, in first-seen order.
    pub settings: IndexMap<String, String>,
    pub intents: IndexMap<String, Intent>,
    pub registry: EntityRegistry,
    /// `@entity.inherits` metadata by entity name.
    pub entity_inherits: IndexMap<String, Inherits>,
    utterances: Vec<Utterance>,
    utterance_index: HashMap<(String, String), usize>,
    patterns: Vec<Pattern>,
    pattern_index: HashSet<Pattern>,
    /// Entities labelled at least once without a role.
    unroled_labels: HashSet<String>,
}

impl LuisApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or lazily create an intent.
    pub fn ensure_intent(&mut self, name: &str) -> &mut Intent {
        self.intents
            .entry(name.to_owned())
            .or_insert_with(|| Intent {
                name: name.to_owned(),
                inherits: None,
            })
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Add an utterance, or merge labels into an existing one with the
    /// same text and intent.
    pub fn add_utterance(&mut self, text: &str, intent: &str, labels: Vec<EntityLabel>) {
        for label in &labels {
            self.note_label(&label.entity, label.role.as_deref());
        }
        let key = (text.to_owned(), intent.to_owned());
        match self.utterance_index.get(&key) {
            Some(&i) => {
                let existing = &mut self.utterances[i].entities;
                for label in labels {
                    if !existing.contains(&label) {
                        existing.push(label);
                    }
                }
            }
            None => {
                self.utterance_index.insert(key, self.utterances.len());
                self.utterances.push(Utterance {
                    text: text.to_owned(),
                    intent: intent.to_owned(),
                    entities: labels,
                });
            }
        }
    }

    /// Returns `false` if an identical pattern already exists.
    pub fn add_pattern(&mut self, pattern: Pattern) -> bool {
        if self.pattern_index.contains(&pattern) {
            return false;
        }
        self.pattern_index.insert(pattern.clone());
        self.patterns.push(pattern);
        true
    }

    /// Record that `entity` was labelled in an utterance. Nested labels,
    /// which have no span of their own, are recorded through this too.
    pub fn note_label(&mut self, entity: &str, role: Option<&str>) {
        if role.is_none() {
            self.unroled_labels.insert(entity.to_owned());
        }
    }

    /// Whether `entity` appears as a role-less label in any utterance.
    pub fn is_labelled_without_role(&self, entity: &str) -> bool {
        self.unroled_labels.contains(entity)
    }
}

// ──────────────────────────────────────────────
// QnA knowledge base
// ──────────────────────────────────────────────

pub const DEFAULT_QNA_SOURCE: &str = "custom editorial";

#[derive(Debug, Clone, PartialEq)]
pub struct QnaPair {
    /// Assigned by the consumer; always 0 here.
    pub id: u32,
    pub answer: String,
    pub source: String,
    pub questions: Vec<String>,
    pub metadata: Vec<(String, String)>,
}

/// A non-HTML document imported by URL.
#[derive(Debug, Clone, PartialEq)]
pub struct QnaFile {
    pub file_uri: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct QnaKb {
    /// `@kb.*` directives, in first-seen order.
    pub settings: IndexMap<String, String>,
    pub qna_list: Vec<QnaPair>,
    pub urls: Vec<String>,
    pub files: Vec<QnaFile>,
    pub word_alterations: Vec<Vec<String>>,
}

// ──────────────────────────────────────────────
// Parse output
// ──────────────────────────────────────────────

/// Everything one file produced. Read-only for consumers.
#[derive(Debug, Default)]
pub struct ParsedContent {
    pub luis: LuisApp,
    pub qna: QnaKb,
    /// Local imports for the caller to parse; never merged here.
    pub additional_files: Vec<String>,
    /// Non-fatal findings, in the order they were raised.
    pub warnings: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_set_equality_ignores_order() {
        let a: RoleSet = ["x", "y"].into_iter().collect();
        let b: RoleSet = ["y", "x"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.as_slice(), ["x", "y"]);
    }

    #[test]
    fn role_set_insert_dedups() {
        let mut roles = RoleSet::new();
        assert!(roles.insert("r"));
        assert!(!roles.insert("r"));
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn utterances_merge_labels_by_text_and_intent() {
        let mut app = LuisApp::new();
        let label = |e: &str| EntityLabel {
            entity: e.to_owned(),
            start_pos: 0,
            end_pos: 1,
            role: None,
        };
        app.add_utterance("hi", "Greet", vec![label("a")]);
        app.add_utterance("hi", "Greet", vec![label("a"), label("b")]);
        app.add_utterance("hi", "Other", vec![]);
        assert_eq!(app.utterances().len(), 2);
        assert_eq!(app.utterances()[0].entities.len(), 2);
        assert!(app.is_labelled_without_role("b"));
    }

    #[test]
    fn patterns_are_deduplicated() {
        let mut app = LuisApp::new();
        let p = Pattern {
            pattern: "book {room}".into(),
            intent: "Book".into(),
        };
        assert!(app.add_pattern(p.clone()));
        assert!(!app.add_pattern(p));
        assert_eq!(app.patterns().len(), 1);
    }

    #[test]
    fn phrase_lists_report_no_roles() {
        let pl = EntityRecord::new(EntityKind::PhraseList, "pl");
        assert!(pl.roles().is_empty());
        assert_eq!(pl.kind(), EntityKind::PhraseList);
    }
}

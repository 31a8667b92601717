//! Pass 3: semantic merge -- entity declarations and intent utterances,
//! interleaved in source order, folded into the entity registry.
//!
//! Every handler resolves what it is about to change and checks it first,
//! then applies the change. A failure aborts the file, so nothing here
//! tries to undo a half-applied declaration.

mod alterations;
mod composite;
mod flatten;
mod list;
mod pattern_any;
mod phrase_list;
mod prebuilt;
mod regex;
mod simple;
mod utterance;

pub use flatten::{flatten, FlatLabel, FlatUtterance, FlattenError};

use crate::ast::{BodyLine, LegacyEntitySection, NewEntitySection, Provenance, Section};
use crate::config::ParseOptions;
use crate::error::{ErrorCode, LuError, Warnings};
use crate::model::{EntityKind, EntityRecord, LuisApp, QnaKb, RoleSet};
use crate::registry::RegistryError;

/// Read-only settings shared by every handler.
pub struct MergeContext<'a> {
    /// Locale for prebuilt availability.
    pub locale: &'a str,
    pub options: &'a ParseOptions,
}

/// One entity declaration, normalized from either syntax.
pub(crate) struct Declaration<'s> {
    pub name: &'s str,
    pub roles: RoleSet,
    /// Text after `=`; `None` when the declaration has no definition.
    pub inline: Option<&'s str>,
    pub lines: &'s [BodyLine],
    pub prov: &'s Provenance,
}

impl Declaration<'_> {
    pub fn has_definition(&self) -> bool {
        self.inline.is_some() || !self.lines.is_empty()
    }

    pub fn has_body(&self) -> bool {
        self.inline.is_some_and(|s| !s.trim().is_empty()) || !self.lines.is_empty()
    }

    pub fn invalid(&self, code: ErrorCode, message: impl Into<String>) -> LuError {
        LuError::at(code, self.prov, message)
    }
}

pub fn merge(
    sections: &[Section],
    app: &mut LuisApp,
    kb: &mut QnaKb,
    ctx: &MergeContext,
    warnings: &mut Warnings,
) -> Result<(), LuError> {
    for section in sections {
        match section {
            Section::NewEntity(e) => declare_new(e, app, ctx, warnings)?,
            Section::LegacyEntity(e) => declare_legacy(e, app, kb, ctx, warnings)?,
            Section::Intent(intent) => {
                app.ensure_intent(&intent.name);
                for line in &intent.utterances {
                    utterance::resolve_utterance(line, &intent.name, app, ctx.options)?;
                }
            }
            Section::ModelInfo(_) | Section::Import(_) | Section::Qna(_) => {}
        }
    }
    tracing::debug!(
        entities = app.registry.len(),
        utterances = app.utterances().len(),
        patterns = app.patterns().len(),
        "merge complete"
    );
    Ok(())
}

// ──────────────────────────────────────────────
// New-style declarations: `@ <type> <name> ...`
// ──────────────────────────────────────────────

fn declare_new(
    section: &NewEntitySection,
    app: &mut LuisApp,
    ctx: &MergeContext,
    warnings: &mut Warnings,
) -> Result<(), LuError> {
    let (inline, lines) = match &section.definition {
        Some(def) => (Some(def.inline.as_str()), def.lines.as_slice()),
        None => (None, &[][..]),
    };
    let decl = Declaration {
        name: &section.name,
        roles: section.roles.iter().collect(),
        inline,
        lines,
        prov: &section.prov,
    };

    match section.entity_type.to_ascii_lowercase().as_str() {
        "simple" | "ml" => simple::declare_simple(app, &decl),
        "list" => list::declare_list(app, &decl, None),
        "composite" => composite::declare_composite(app, &decl),
        "regex" => regex::declare_regex(app, &decl),
        "prebuilt" => prebuilt::declare_prebuilt(app, &decl, ctx, warnings),
        "patternany" | "pattern.any" => pattern_any::declare_pattern_any(app, &decl),
        "phraselist" => phrase_list::declare_phrase_list(app, &decl, section.interchangeable),
        other => Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!(
                "unknown entity type '{}' for entity '{}'. Valid types are: simple, ml, list, composite, regex, prebuilt, patternany, phraselist",
                other, section.name
            ),
        )),
    }
}

// ──────────────────────────────────────────────
// Legacy declarations: `$<name>:<type string>`
// ──────────────────────────────────────────────

fn declare_legacy(
    section: &LegacyEntitySection,
    app: &mut LuisApp,
    kb: &mut QnaKb,
    ctx: &MergeContext,
    warnings: &mut Warnings,
) -> Result<(), LuError> {
    let (core, roles) = split_legacy_roles(&section.type_string);
    let lower = core.to_ascii_lowercase();

    let mut decl = Declaration {
        name: &section.name,
        roles,
        inline: None,
        lines: &section.lines,
        prov: &section.prov,
    };

    if section.name.eq_ignore_ascii_case("prebuilt") {
        decl.name = core;
        return prebuilt::declare_prebuilt(app, &decl, ctx, warnings);
    }
    if core.starts_with('/') {
        decl.inline = Some(core);
        return regex::declare_regex(app, &decl);
    }
    if core.starts_with('[') {
        decl.inline = Some(core);
        return composite::declare_composite(app, &decl);
    }
    if let Some(rest) = lower.strip_prefix("qna-alterations") {
        if rest.trim() == "=" {
            alterations::add_alterations(kb, &decl);
            return Ok(());
        }
    }
    if let Some(canonical) = core.strip_suffix('=') {
        decl.inline = Some("");
        return list::declare_list(app, &decl, Some(canonical.trim()));
    }

    let mut words = lower.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("simple"), None, _) => simple::declare_simple(app, &decl),
        (Some("patternany" | "pattern.any"), None, _) => pattern_any::declare_pattern_any(app, &decl),
        (Some("phraselist"), flag, None) => {
            let interchangeable = match flag {
                None => false,
                Some("interchangeable") => true,
                Some(other) => {
                    return Err(decl.invalid(
                        ErrorCode::InvalidInput,
                        format!("unknown phrase list flag '{}'", other),
                    ))
                }
            };
            phrase_list::declare_phrase_list(app, &decl, interchangeable)
        }
        _ => Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!(
                "unrecognized definition '{}' for entity '{}'",
                section.type_string, section.name
            ),
        )),
    }
}

/// Split a trailing `Roles=a,b` clause off a legacy type string. A regex
/// keeps everything up to its closing slash.
fn split_legacy_roles(type_string: &str) -> (&str, RoleSet) {
    let search_from = if type_string.starts_with('/') {
        type_string.rfind('/').unwrap_or(0)
    } else {
        0
    };
    let lower = type_string.to_ascii_lowercase();
    let found = lower[search_from..]
        .match_indices("roles=")
        .map(|(i, _)| i + search_from)
        .find(|&i| i == 0 || type_string[..i].ends_with(char::is_whitespace));

    match found {
        Some(i) => {
            let roles = type_string[i + "roles=".len()..]
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .collect();
            (type_string[..i].trim(), roles)
        }
        None => (type_string.trim(), RoleSet::new()),
    }
}

// ──────────────────────────────────────────────
// Shared helpers
// ──────────────────────────────────────────────

/// Kinds whose labels must always carry a role.
fn requires_role(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::List | EntityKind::Regex | EntityKind::Prebuilt
    )
}

/// Clear the way for a concrete declaration of `kind`: absorb a same-named
/// simple entity (list, composite and regex only, and never one already
/// labelled without a role), pop a pattern-any placeholder, and reject any
/// other kind. Returns the roles the removed
/// record carried.
fn take_over(
    app: &mut LuisApp,
    name: &str,
    kind: EntityKind,
    prov: &Provenance,
) -> Result<RoleSet, LuError> {
    match app.registry.kind_of(name) {
        None => Ok(RoleSet::new()),
        Some(existing) if existing == kind => Ok(RoleSet::new()),
        Some(EntityKind::PatternAny) => Ok(app.registry.remove_pattern_any(name).unwrap_or_default()),
        Some(EntityKind::Simple) if absorbs_simple(kind) => {
            if app.is_labelled_without_role(name) {
                return Err(LuError::at(
                    ErrorCode::InvalidInput,
                    prov,
                    format!(
                        "cannot label entity '{}' without a role: it is redefined as a {} entity after being labelled as a simple one",
                        name, kind
                    ),
                ));
            }
            Ok(app
                .registry
                .remove_kind(name, EntityKind::Simple)
                .unwrap_or_default())
        }
        Some(existing) => Err(RegistryError::DuplicateEntity {
            name: name.to_owned(),
            existing,
            requested: kind,
        }
        .at(prov)),
    }
}

fn absorbs_simple(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::List | EntityKind::Composite | EntityKind::Regex
    )
}

/// Take over `name` as `kind`, then register it with the carried and
/// declared roles.
fn declare<'a>(
    app: &'a mut LuisApp,
    kind: EntityKind,
    name: &str,
    declared: &RoleSet,
    prov: &Provenance,
) -> Result<&'a mut EntityRecord, LuError> {
    let mut roles = take_over(app, name, kind, prov)?;
    roles.extend(declared);
    app.registry
        .assert_name_role_disjoint(name, &roles, kind)
        .map_err(|e| e.at(prov))?;
    app.registry
        .upsert(kind, name, &roles)
        .map_err(|e| e.at(prov))
}

/// Add roles to an existing record of `kind`, or create one.
fn add_roles(
    app: &mut LuisApp,
    kind: EntityKind,
    name: &str,
    roles: &RoleSet,
    prov: &Provenance,
) -> Result<(), LuError> {
    app.registry
        .assert_name_role_disjoint(name, roles, kind)
        .map_err(|e| e.at(prov))?;
    app.registry
        .upsert(kind, name, roles)
        .map(|_| ())
        .map_err(|e| e.at(prov))
}

/// Every comma-separated item of the inline text and body lines.
fn body_items<'s>(decl: &Declaration<'s>) -> Vec<&'s str> {
    decl.inline
        .into_iter()
        .chain(decl.lines.iter().map(|l| l.text.as_str()))
        .flat_map(|text| text.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

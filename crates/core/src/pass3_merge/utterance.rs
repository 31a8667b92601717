//! Utterance and pattern resolution against the entity registry.

use super::flatten::{flatten, placeholder_text, FlatLabel};
use super::{add_roles, requires_role};
use crate::ast::{Provenance, UtteranceLine, UtteranceNode};
use crate::config::ParseOptions;
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, EntityLabel, LuisApp, Pattern, RoleSet};

pub(super) fn resolve_utterance(
    line: &UtteranceLine,
    intent: &str,
    app: &mut LuisApp,
    options: &ParseOptions,
) -> Result<(), LuError> {
    let prov = &line.prov;
    let flat = flatten(&line.nodes, options.allow_nested_labels)
        .map_err(|e| LuError::at(ErrorCode::InvalidInput, prov, e.to_string()))?;

    if flat.labels.is_empty() {
        app.add_utterance(&flat.text, intent, Vec::new());
        return Ok(());
    }

    let valued = flat.labels.iter().filter(|l| l.has_value).count();
    if valued == 0 {
        return add_pattern(line, intent, app);
    }
    if valued < flat.labels.len() {
        return Err(LuError::at(
            ErrorCode::InvalidInput,
            prov,
            format!(
                "utterance '{}' has a mix of entities with labelled values and entities without; use either all labelled values or all placeholders",
                flat.text
            ),
        ));
    }

    for label in flat.nested.iter().chain(flat.labels.iter()) {
        if label.is_empty() {
            return Err(LuError::at(
                ErrorCode::MissingLabelledValue,
                prov,
                format!("no labelled value found for entity '{}'", label.entity),
            ));
        }
    }

    // Inner entities are registered, but only top-level spans are emitted.
    for label in &flat.nested {
        let (entity, role) = label_target(app, label);
        resolve_label(app, &entity, role.as_deref(), prov)?;
        app.note_label(&entity, role.as_deref());
    }

    let mut labels = Vec::with_capacity(flat.labels.len());
    for label in &flat.labels {
        let (entity, role) = label_target(app, label);
        resolve_label(app, &entity, role.as_deref(), prov)?;
        labels.push(EntityLabel {
            entity,
            start_pos: label.start,
            end_pos: label.end - 1,
            role,
        });
    }

    app.add_utterance(&flat.text, intent, labels);
    Ok(())
}

/// `{@name=value}` names an entity or one of its roles; anything else is
/// taken as written.
fn label_target(app: &LuisApp, label: &FlatLabel) -> (String, Option<String>) {
    if label.at_reference && label.role.is_none() {
        if let Some(owner) = app.registry.role_owner(&label.entity) {
            return (owner.to_owned(), Some(label.entity.clone()));
        }
    }
    (label.entity.clone(), label.role.clone())
}

/// Register a labelled entity, in priority order: composite, list,
/// prebuilt, regex, pattern-any (promoted to simple), simple.
fn resolve_label(
    app: &mut LuisApp,
    entity: &str,
    role: Option<&str>,
    prov: &Provenance,
) -> Result<(), LuError> {
    let roles: RoleSet = role.into_iter().collect();
    match app.registry.kind_of(entity) {
        Some(kind) if requires_role(kind) && role.is_none() => Err(LuError::at(
            ErrorCode::InvalidInput,
            prov,
            format!(
                "{} entity '{}' can only be labelled with a role, e.g. {{{}:<role>=value}}",
                kind, entity, entity
            ),
        )),
        Some(EntityKind::PatternAny) => {
            let mut carried = app.registry.remove_pattern_any(entity).unwrap_or_default();
            carried.extend(&roles);
            add_roles(app, EntityKind::Simple, entity, &carried, prov)
        }
        Some(kind) => add_roles(app, kind, entity, &roles, prov),
        None => add_roles(app, EntityKind::Simple, entity, &roles, prov),
    }
}

/// Every label is a placeholder: record a pattern and register each
/// placeholder's entity.
fn add_pattern(line: &UtteranceLine, intent: &str, app: &mut LuisApp) -> Result<(), LuError> {
    let mut text = String::new();
    for node in &line.nodes {
        match node {
            UtteranceNode::Text(t) => push_escaped(&mut text, t),
            UtteranceNode::Label(label) if label.at_reference => {
                match resolve_at_reference(app, &label.entity) {
                    Some((entity, Some(role))) => text.push_str(&format!("{{{}:{}}}", entity, role)),
                    Some((entity, None)) => text.push_str(&format!("{{{}}}", entity)),
                    // left as written, registers nothing
                    None => text.push_str(&placeholder_text(label)),
                }
            }
            UtteranceNode::Label(label) => {
                register_placeholder(app, &label.entity, label.role.as_deref(), &line.prov)?;
                text.push_str(&placeholder_text(label));
            }
        }
    }

    app.ensure_intent(intent);
    app.add_pattern(Pattern {
        pattern: text.trim().to_owned(),
        intent: intent.to_owned(),
    });
    Ok(())
}

/// Literal text inside a pattern keeps its escapes so braces stay literal.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if matches!(c, '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

fn resolve_at_reference(app: &LuisApp, name: &str) -> Option<(String, Option<String>)> {
    if let Some(owner) = app.registry.role_owner(name) {
        return Some((owner.to_owned(), Some(name.to_owned())));
    }
    app.registry
        .get(name)
        .map(|record| (record.name().to_owned(), None))
}

/// A placeholder adds its role to an entity of any other kind, or
/// registers a pattern-any entity.
fn register_placeholder(
    app: &mut LuisApp,
    entity: &str,
    role: Option<&str>,
    prov: &Provenance,
) -> Result<(), LuError> {
    let roles: RoleSet = role.into_iter().collect();
    let kind = app.registry.kind_of(entity).unwrap_or(EntityKind::PatternAny);
    add_roles(app, kind, entity, &roles, prov)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{run, run_with};
    use crate::config::ParseOptions;
    use crate::error::ErrorCode;
    use crate::model::{EntityKind, EntityLabel};
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_utterances_are_deduplicated() {
        let app = run("# Greet\n- hi\n- hi\n- hello\n").unwrap();
        assert_eq!(app.utterances().len(), 2);
        assert!(app.intents.contains_key("Greet"));
    }

    #[test]
    fn labels_register_simple_entities() {
        let app = run("# Fly\n- fly to {city=paris}\n").unwrap();
        let u = &app.utterances()[0];
        assert_eq!(u.text, "fly to paris");
        assert_eq!(
            u.entities,
            vec![EntityLabel {
                entity: "city".into(),
                start_pos: 7,
                end_pos: 11,
                role: None,
            }]
        );
        assert_eq!(app.registry.kind_of("city"), Some(EntityKind::Simple));
    }

    #[test]
    fn placeholders_make_patterns_and_pattern_any_entities() {
        let app = run("# Book\n- book {room} for {guest:vip}\n- book {room} for {guest:vip}\n").unwrap();
        assert_eq!(app.patterns().len(), 1);
        assert_eq!(app.patterns()[0].pattern, "book {room} for {guest:vip}");
        assert_eq!(app.registry.kind_of("room"), Some(EntityKind::PatternAny));
        assert_eq!(app.registry.get("guest").unwrap().roles().as_slice(), ["vip"]);
        assert!(app.utterances().is_empty());
    }

    #[test]
    fn escaped_braces_stay_literal_in_patterns() {
        let app = run("# See\n- see \\{b\\} and {x}\n").unwrap();
        assert_eq!(app.patterns()[0].pattern, r"see \{b\} and {x}");
        assert!(app.registry.get("b").is_none());
        assert_eq!(app.registry.kind_of("x"), Some(EntityKind::PatternAny));
    }

    #[test]
    fn placeholder_adds_role_to_declared_entity() {
        let app = run("@ list city =\n- paris:\n- cdg\n# Fly\n- fly to {city:dest}\n").unwrap();
        let city = app.registry.get("city").unwrap();
        assert_eq!(city.kind(), EntityKind::List);
        assert_eq!(city.roles().as_slice(), ["dest"]);
    }

    #[test]
    fn at_references_are_rewritten() {
        let app = run(
            "@ prebuilt number hasRoles count\n@ simple room\n# Book\n- book {@count} rooms like {@room} or {@nothing}\n",
        )
        .unwrap();
        assert_eq!(
            app.patterns()[0].pattern,
            "book {number:count} rooms like {room} or {@nothing}"
        );
        assert!(app.registry.get("nothing").is_none());
    }

    #[test]
    fn mixed_labels_are_rejected() {
        let err = run("# Book\n- book {room} for {guest=bob}\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("mix of entities with labelled values"));
    }

    #[test]
    fn role_required_kinds_need_a_role() {
        let err = run("@ regex code = /[0-9]+/\n# Q\n- code {code=123}\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let app = run("@ regex code hasRoles pin = /[0-9]+/\n# Q\n- code {code:pin=123}\n").unwrap();
        assert_eq!(app.utterances()[0].entities[0].role.as_deref(), Some("pin"));
    }

    #[test]
    fn at_label_resolves_role() {
        let app = run("@ prebuilt number hasRoles count\n# Q\n- {@count=3} rooms\n").unwrap();
        let label = &app.utterances()[0].entities[0];
        assert_eq!(label.entity, "number");
        assert_eq!(label.role.as_deref(), Some("count"));
    }

    #[test]
    fn labelled_pattern_any_is_promoted_to_simple() {
        let app = run("# Book\n- book {room:r1}\n- book {room=suite}\n").unwrap();
        let room = app.registry.get("room").unwrap();
        assert_eq!(room.kind(), EntityKind::Simple);
        assert_eq!(room.roles().as_slice(), ["r1"]);
    }

    #[test]
    fn empty_value_is_missing_labelled_value() {
        let err = run("# Fly\n- fly to {city=}\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingLabelledValue);
    }

    #[test]
    fn nested_labels_register_inner_entities() {
        let app = run("# Greet\n- hi {userName=foo {firstName=bar}}\n").unwrap();
        let u = &app.utterances()[0];
        assert_eq!(u.text, "hi foo bar");
        assert_eq!(u.entities.len(), 1);
        assert_eq!((u.entities[0].start_pos, u.entities[0].end_pos), (3, 9));
        assert_eq!(app.registry.kind_of("firstName"), Some(EntityKind::Simple));
    }

    #[test]
    fn nested_labels_rejected_when_disallowed() {
        let opts = ParseOptions::default().allow_nested_labels(false);
        let err = run_with("# Greet\n- hi {userName=foo {firstName=bar}}\n", &opts).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn repeated_utterance_merges_labels() {
        let app = run("# Fly\n- fly to {city=paris}\n- fly to {city:dest=paris}\n").unwrap();
        assert_eq!(app.utterances().len(), 1);
        assert_eq!(app.utterances()[0].entities.len(), 2);
    }
}

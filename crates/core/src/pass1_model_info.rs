//! Pass 1: model-info directives (`> !# @scope.key = value`).
//!
//! Runs before everything else so `@app.culture` is known when prebuilt
//! declarations are validated. Malformed directives are skipped with a
//! warning.

use crate::ast::{ModelInfoLine, Section};
use crate::error::{ErrorCode, LuError, Warnings};
use crate::model::{EntityKind, Inherits, LuisApp, QnaKb, RoleSet};

pub fn apply_model_info(
    sections: &[Section],
    app: &mut LuisApp,
    kb: &mut QnaKb,
    warnings: &mut Warnings,
) -> Result<(), LuError> {
    for section in sections {
        if let Section::ModelInfo(info) = section {
            apply_directive(info, app, kb, warnings)?;
        }
    }
    Ok(())
}

fn apply_directive(
    info: &ModelInfoLine,
    app: &mut LuisApp,
    kb: &mut QnaKb,
    warnings: &mut Warnings,
) -> Result<(), LuError> {
    let line = info.prov.line;
    let Some((key, value)) = split_directive(&info.directive) else {
        warnings.warn(
            ErrorCode::InvalidInput,
            line,
            format!("ignoring model info '{}': expected '@scope.key = value'", info.directive),
        );
        return Ok(());
    };

    let segments: Vec<&str> = key.split('.').collect();
    let [scope, name] = segments.as_slice() else {
        warnings.warn(
            ErrorCode::InvalidInput,
            line,
            format!("ignoring model info '{}': key must be '<scope>.<name>'", key),
        );
        return Ok(());
    };

    match (*scope, *name) {
        ("app", name) => {
            app.settings.insert(name.to_owned(), value.to_owned());
        }
        ("kb", name) => {
            kb.settings.insert(name.to_owned(), value.to_owned());
        }
        ("intent", "inherits") => match parse_inherits(value) {
            Some((intent, inherits)) => {
                app.ensure_intent(&intent).inherits = Some(inherits);
            }
            None => warn_inherits(warnings, line, value),
        },
        ("entity", "inherits") => match parse_inherits(value) {
            Some((entity, inherits)) => {
                if app.registry.get(&entity).is_none() {
                    let roles = RoleSet::new();
                    app.registry
                        .assert_name_role_disjoint(&entity, &roles, EntityKind::Simple)
                        .map_err(|e| e.at(&info.prov))?;
                    app.registry
                        .upsert(EntityKind::Simple, &entity, &roles)
                        .map_err(|e| e.at(&info.prov))?;
                }
                app.entity_inherits.insert(entity, inherits);
            }
            None => warn_inherits(warnings, line, value),
        },
        _ => warnings.warn(
            ErrorCode::InvalidInput,
            line,
            format!("ignoring unknown model info '@{}'", key),
        ),
    }
    Ok(())
}

/// `@scope.key = value` → `("scope.key", "value")`.
fn split_directive(directive: &str) -> Option<(&str, &str)> {
    let (key, value) = directive.strip_prefix('@')?.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// `name : <n> : domain_name : <d> : model_name : <m>`
fn parse_inherits(value: &str) -> Option<(String, Inherits)> {
    let parts: Vec<&str> = value.split(':').map(str::trim).collect();
    if parts.len() != 6 || parts[1].is_empty() {
        return None;
    }
    Some((
        parts[1].to_owned(),
        Inherits {
            domain_name: parts[3].to_owned(),
            model_name: parts[5].to_owned(),
        },
    ))
}

fn warn_inherits(warnings: &mut Warnings, line: u32, value: &str) {
    warnings.warn(
        ErrorCode::InvalidInput,
        line,
        format!(
            "ignoring inherits '{}': expected 'name : <name> : domain_name : <domain> : model_name : <model>'",
            value
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Provenance;

    fn directive(text: &str) -> Section {
        Section::ModelInfo(ModelInfoLine {
            directive: text.to_owned(),
            prov: Provenance {
                file: "m.lu".into(),
                line: 1,
                text: format!("> !# {}", text),
            },
        })
    }

    fn run(lines: &[&str]) -> (LuisApp, QnaKb, Vec<crate::error::Diagnostic>) {
        let sections: Vec<Section> = lines.iter().map(|l| directive(l)).collect();
        let mut app = LuisApp::new();
        let mut kb = QnaKb::default();
        let mut warnings = Warnings::new(false);
        apply_model_info(&sections, &mut app, &mut kb, &mut warnings).unwrap();
        (app, kb, warnings.into_vec())
    }

    #[test]
    fn app_and_kb_settings_are_recorded() {
        let (app, kb, warnings) = run(&["@app.culture = fr-fr", "@kb.name = faq"]);
        assert_eq!(app.settings["culture"], "fr-fr");
        assert_eq!(kb.settings["name"], "faq");
        assert!(warnings.is_empty());
    }

    #[test]
    fn intent_inherits_creates_intent() {
        let (app, _, _) =
            run(&["@intent.inherits = name : Cancel : domain_name : Utilities : model_name : Cancel"]);
        let inherits = app.intents["Cancel"].inherits.as_ref().unwrap();
        assert_eq!(inherits.domain_name, "Utilities");
        assert_eq!(inherits.model_name, "Cancel");
    }

    #[test]
    fn entity_inherits_creates_simple_entity() {
        let (app, _, _) =
            run(&["@entity.inherits = name : Place : domain_name : Places : model_name : Place"]);
        assert_eq!(app.registry.kind_of("Place"), Some(EntityKind::Simple));
        assert_eq!(app.entity_inherits["Place"].domain_name, "Places");
    }

    #[test]
    fn malformed_directives_warn_and_skip() {
        let (app, _, warnings) = run(&[
            "@app.a.b = x",
            "@bogus.key = y",
            "@intent.inherits = name : X",
            "no at sign",
        ]);
        assert!(app.settings.is_empty());
        assert!(app.intents.is_empty());
        assert_eq!(warnings.len(), 4);
    }
}

//! Phrase lists live beside the entity namespace, so they never absorb or
//! collide with a same-named entity.

use super::Declaration;
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityRecord, LuisApp};

pub(super) fn declare_phrase_list(
    app: &mut LuisApp,
    decl: &Declaration,
    interchangeable: bool,
) -> Result<(), LuError> {
    if !decl.roles.is_empty() {
        return Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!(
                "phrase list '{}' cannot have roles, found: {}",
                decl.name,
                decl.roles.as_slice().join(", ")
            ),
        ));
    }

    if let Some(EntityRecord::PhraseList {
        interchangeable: existing,
        ..
    }) = app.registry.phrase_list(decl.name)
    {
        if *existing != interchangeable {
            return Err(decl.invalid(
                ErrorCode::InvalidInput,
                format!(
                    "phrase list '{}' is already defined with interchangeable = {}",
                    decl.name, existing
                ),
            ));
        }
    }

    let values = super::body_items(decl);
    if let EntityRecord::PhraseList { values: existing, .. } =
        app.registry.upsert_phrase_list(decl.name, interchangeable)
    {
        for value in values {
            if !existing.iter().any(|v| v == value) {
                existing.push(value.to_owned());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::run;
    use crate::error::ErrorCode;
    use crate::model::{EntityKind, EntityRecord};

    #[test]
    fn values_are_appended_without_duplicates() {
        let app = run("@ phraselist pl(interchangeable) =\n- a, b\n- c\n@ phraselist pl(interchangeable) =\n- b, d\n")
            .unwrap();
        match app.registry.phrase_list("pl") {
            Some(EntityRecord::PhraseList {
                values,
                interchangeable,
                ..
            }) => {
                assert_eq!(values, &["a", "b", "c", "d"]);
                assert!(interchangeable);
            }
            other => panic!("Expected phrase list, got {:?}", other),
        }
    }

    #[test]
    fn roles_are_rejected() {
        let err = run("@ phraselist pl hasRoles r =\n- a\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("cannot have roles"));
    }

    #[test]
    fn conflicting_flag_is_rejected() {
        let err = run("$pl:PhraseList\n- a\n$pl:PhraseList interchangeable\n- b\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn name_may_reuse_an_entity_name() {
        let app = run("@ simple city\n@ phraselist city =\n- seattle\n").unwrap();
        assert_eq!(app.registry.kind_of("city"), Some(EntityKind::Simple));
        assert!(app.registry.phrase_list("city").is_some());
    }
}

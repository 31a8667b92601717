//! End-to-end merge scenarios through `parse_content`.

use lu_core::{
    luis_to_json, parse_content, EntityKind, EntityRecord, ErrorCode, OfflineProbe, ParseOptions,
    ParsedContent, SubList,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn parse(src: &str) -> ParsedContent {
    parse_content(src, "scenario.lu", &ParseOptions::default(), &OfflineProbe)
        .unwrap_or_else(|e| panic!("unexpected error: {}", e))
}

fn parse_err(src: &str) -> lu_core::LuError {
    match parse_content(src, "scenario.lu", &ParseOptions::default(), &OfflineProbe) {
        Ok(_) => panic!("expected an error for:\n{}", src),
        Err(e) => e,
    }
}

#[test]
fn simple_and_list_declarations() {
    let content = parse(
        "@ simple s1 sr1\n\
         @ list l1 hasRoles lr1,lr2 =\n\
         \x20   - one:\n\
         \x20       - two\n\
         \x20       - three\n\
         \x20   - four:\n\
         \x20       - five\n\
         \x20       - six\n",
    );
    let registry = &content.luis.registry;
    assert_eq!(registry.len(), 2);

    let s1 = registry.get("s1").unwrap();
    assert_eq!(s1.kind(), EntityKind::Simple);
    assert_eq!(s1.roles().as_slice(), ["sr1"]);

    match registry.get("l1").unwrap() {
        EntityRecord::List {
            roles, sublists, ..
        } => {
            assert_eq!(roles.as_slice(), ["lr1", "lr2"]);
            assert_eq!(
                sublists,
                &vec![
                    SubList {
                        canonical_form: "one".into(),
                        synonyms: vec!["two".into(), "three".into()],
                    },
                    SubList {
                        canonical_form: "four".into(),
                        synonyms: vec!["five".into(), "six".into()],
                    },
                ]
            );
        }
        other => panic!("Expected list, got {:?}", other),
    }
}

// The inner value stays in the text ("hi foo bar", not "hi foo"); only the
// outer span is emitted.
#[test]
fn nested_label_flattens_to_one_span() {
    let content = parse("# Greet\n- hi {userName=foo {firstName=bar}}\n");
    let json = luis_to_json(&content.luis);
    assert_eq!(
        json["utterances"],
        json!([{
            "text": "hi foo bar",
            "intent": "Greet",
            "entities": [{ "entity": "userName", "startPos": 3, "endPos": 9 }],
        }])
    );
    assert_eq!(
        content.luis.registry.kind_of("firstName"),
        Some(EntityKind::Simple)
    );
}

#[test]
fn nested_label_rejected_when_disallowed() {
    let opts = ParseOptions::default().allow_nested_labels(false);
    let err = parse_content(
        "# Greet\n- hi {userName=foo {firstName=bar}}\n",
        "scenario.lu",
        &opts,
        &OfflineProbe,
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.line, 2);
}

#[test]
fn mixed_pattern_any_and_labelled_value_fails() {
    let err = parse_err("# Book\n- book {room} for {guest=bob}\n");
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("mix of entities with labelled values"));
    assert_eq!(err.context.as_deref(), Some("- book {room} for {guest=bob}"));
}

#[test]
fn phrase_list_with_roles_fails() {
    let err = parse_err("@ phraselist pl hasRoles r =\n- a, b\n");
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn unknown_prebuilt_lists_valid_types() {
    let err = parse_err("$PREBUILT:colour\n");
    assert_eq!(err.code, ErrorCode::InvalidInput);
    for t in ["age", "datetimeV2", "number", "url"] {
        assert!(err.message.contains(t), "missing {} in {}", t, err.message);
    }
}

#[test]
fn composite_redeclaration() {
    let content = parse("@ composite c hasRoles r1 = [a, b]\n@ composite c hasRoles r2 = [b, a]\n");
    assert_eq!(
        content.luis.registry.get("c").unwrap().roles().as_slice(),
        ["r1", "r2"]
    );

    let err = parse_err("@ composite c = [a, b]\n@ composite c = [x, y]\n");
    assert_eq!(err.code, ErrorCode::InvalidCompositeEntity);
}

#[test]
fn pattern_any_promotion_keeps_roles() {
    let content = parse(
        "# Book\n- book {room:r1}\n- reserve {room:r2} now\n@ simple room hasRoles r3\n",
    );
    let room = content.luis.registry.get("room").unwrap();
    assert_eq!(room.kind(), EntityKind::Simple);
    assert_eq!(room.roles().as_slice(), ["r1", "r2", "r3"]);
    assert_eq!(content.luis.patterns().len(), 2);
}

#[test]
fn role_reused_as_entity_name_fails() {
    let err = parse_err("@ simple A\n@ simple B hasRoles A\n");
    assert_eq!(err.code, ErrorCode::RoleNameCollision);
    assert_eq!(err.line, 2);

    let err = parse_err("@ simple B hasRoles A\n@ simple A\n");
    assert_eq!(err.code, ErrorCode::RoleNameCollision);
}

#[test]
fn kind_conflict_is_duplicate_definition() {
    let err = parse_err("@ prebuilt number\n@ simple number\n");
    assert_eq!(err.code, ErrorCode::DuplicateEntityDefinition);
}

#[test]
fn model_info_and_qna_round_out_the_model() {
    let content = parse(
        "> !# @app.versionId = 0.2\n\
         > !# @kb.name = faq\n\
         > !# @app.bogus.key = x\n\
         # ? hello\n\
         - hi there\n\
         ```\n\
         Hi!\n\
         ```\n",
    );
    assert_eq!(content.luis.settings["versionId"], "0.2");
    assert_eq!(content.qna.settings["name"], "faq");
    assert_eq!(content.qna.qna_list[0].questions, ["hello", "hi there"]);
    assert_eq!(content.warnings.len(), 1);
}

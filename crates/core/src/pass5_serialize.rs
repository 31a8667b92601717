//! Pass 5: canonical JSON for the consolidated model.
//!
//! Objects are built key by key so the output shape does not depend on
//! the in-memory types. Keys sort (serde_json's default map); arrays keep
//! declaration order.

use crate::model::{
    EntityKind, EntityLabel, EntityRecord, Inherits, LuisApp, QnaKb, QnaPair, RoleSet,
};
use serde_json::{json, Map, Value};

/// The intent-recognition application, including `@app.*` settings as
/// top-level keys.
pub fn luis_to_json(app: &LuisApp) -> Value {
    let mut m = Map::new();
    for (key, value) in &app.settings {
        m.insert(key.clone(), json!(value));
    }

    let intents: Vec<Value> = app
        .intents
        .values()
        .map(|intent| {
            let mut im = Map::new();
            im.insert("name".to_owned(), json!(intent.name));
            if let Some(inherits) = &intent.inherits {
                im.insert("inherits".to_owned(), serialize_inherits(inherits));
            }
            Value::Object(im)
        })
        .collect();
    m.insert("intents".to_owned(), Value::Array(intents));

    let mut entities = Vec::new();
    let mut composites = Vec::new();
    let mut closed_lists = Vec::new();
    let mut regex_entities = Vec::new();
    let mut prebuilt_entities = Vec::new();
    let mut pattern_any_entities = Vec::new();
    for record in app.registry.iter() {
        let value = serialize_entity(record, app);
        match record.kind() {
            EntityKind::Simple => entities.push(value),
            EntityKind::Composite => composites.push(value),
            EntityKind::List => closed_lists.push(value),
            EntityKind::Regex => regex_entities.push(value),
            EntityKind::Prebuilt => prebuilt_entities.push(value),
            EntityKind::PatternAny => pattern_any_entities.push(value),
            EntityKind::PhraseList => {}
        }
    }
    m.insert("entities".to_owned(), Value::Array(entities));
    m.insert("composites".to_owned(), Value::Array(composites));
    m.insert("closedLists".to_owned(), Value::Array(closed_lists));
    m.insert("regex_entities".to_owned(), Value::Array(regex_entities));
    m.insert("prebuiltEntities".to_owned(), Value::Array(prebuilt_entities));
    m.insert(
        "patternAnyEntities".to_owned(),
        Value::Array(pattern_any_entities),
    );

    let features: Vec<Value> = app
        .registry
        .phrase_lists()
        .map(serialize_phrase_list)
        .collect();
    m.insert("model_features".to_owned(), Value::Array(features));

    let utterances: Vec<Value> = app
        .utterances()
        .iter()
        .map(|u| {
            json!({
                "text": u.text,
                "intent": u.intent,
                "entities": u.entities.iter().map(serialize_label).collect::<Vec<_>>(),
            })
        })
        .collect();
    m.insert("utterances".to_owned(), Value::Array(utterances));

    let patterns: Vec<Value> = app
        .patterns()
        .iter()
        .map(|p| json!({ "pattern": p.pattern, "intent": p.intent }))
        .collect();
    m.insert("patterns".to_owned(), Value::Array(patterns));

    Value::Object(m)
}

/// The knowledge base, including `@kb.*` settings as top-level keys.
/// Word alterations are emitted separately by [`alterations_to_json`].
pub fn qna_to_json(kb: &QnaKb) -> Value {
    let mut m = Map::new();
    for (key, value) in &kb.settings {
        m.insert(key.clone(), json!(value));
    }
    m.insert(
        "qnaList".to_owned(),
        Value::Array(kb.qna_list.iter().map(serialize_qna_pair).collect()),
    );
    m.insert("urls".to_owned(), json!(kb.urls));
    let files: Vec<Value> = kb
        .files
        .iter()
        .map(|f| json!({ "fileName": f.file_name, "fileUri": f.file_uri }))
        .collect();
    m.insert("files".to_owned(), Value::Array(files));
    Value::Object(m)
}

pub fn alterations_to_json(kb: &QnaKb) -> Value {
    let list: Vec<Value> = kb
        .word_alterations
        .iter()
        .map(|words| json!({ "alterations": words }))
        .collect();
    json!({ "wordAlterations": list })
}

fn serialize_roles(roles: &RoleSet) -> Value {
    json!(roles.as_slice())
}

fn serialize_inherits(inherits: &Inherits) -> Value {
    json!({
        "domain_name": inherits.domain_name,
        "model_name": inherits.model_name,
    })
}

fn serialize_entity(record: &EntityRecord, app: &LuisApp) -> Value {
    let mut m = Map::new();
    m.insert("name".to_owned(), json!(record.name()));
    m.insert("roles".to_owned(), serialize_roles(record.roles()));
    // Kept through promotion: a list or composite may take over an
    // inherited simple entity.
    if let Some(inherits) = app.entity_inherits.get(record.name()) {
        m.insert("inherits".to_owned(), serialize_inherits(inherits));
    }
    match record {
        EntityRecord::List { sublists, .. } => {
            let subs: Vec<Value> = sublists
                .iter()
                .map(|s| json!({ "canonicalForm": s.canonical_form, "list": s.synonyms }))
                .collect();
            m.insert("subLists".to_owned(), Value::Array(subs));
        }
        EntityRecord::Composite { children, .. } => {
            m.insert("children".to_owned(), json!(children));
        }
        EntityRecord::Regex { pattern, .. } => {
            m.insert("regexPattern".to_owned(), json!(pattern));
        }
        EntityRecord::PatternAny { explicit_list, .. } => {
            m.insert("explicitList".to_owned(), json!(explicit_list));
        }
        EntityRecord::Simple { .. } | EntityRecord::Prebuilt { .. } | EntityRecord::PhraseList { .. } => {}
    }
    Value::Object(m)
}

fn serialize_phrase_list(record: &EntityRecord) -> Value {
    match record {
        EntityRecord::PhraseList {
            name,
            values,
            interchangeable,
        } => json!({
            "name": name,
            "words": values.join(","),
            "mode": interchangeable,
            "activated": true,
        }),
        other => json!({ "name": other.name() }),
    }
}

fn serialize_label(label: &EntityLabel) -> Value {
    let mut m = Map::new();
    m.insert("entity".to_owned(), json!(label.entity));
    m.insert("startPos".to_owned(), json!(label.start_pos));
    m.insert("endPos".to_owned(), json!(label.end_pos));
    if let Some(role) = &label.role {
        m.insert("role".to_owned(), json!(role));
    }
    Value::Object(m)
}

fn serialize_qna_pair(pair: &QnaPair) -> Value {
    let metadata: Vec<Value> = pair
        .metadata
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    json!({
        "id": pair.id,
        "answer": pair.answer,
        "source": pair.source,
        "questions": pair.questions,
        "metadata": metadata,
    })
}

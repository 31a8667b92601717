//! Closed-list entities. Body lines ending in `:` open a sublist; every
//! other line is a synonym of the current sublist.

use super::{declare, Declaration};
use crate::ast::BodyLine;
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, EntityRecord, LuisApp, SubList};

/// `initial` is the canonical form given in a legacy `$name:value=` header.
pub(super) fn declare_list(
    app: &mut LuisApp,
    decl: &Declaration,
    initial: Option<&str>,
) -> Result<(), LuError> {
    let sublists = collect_sublists(decl, initial)?;
    let record = declare(app, EntityKind::List, decl.name, &decl.roles, decl.prov)?;
    if let EntityRecord::List { sublists: existing, .. } = record {
        for sublist in sublists {
            merge_sublist(existing, sublist);
        }
    }
    Ok(())
}

fn collect_sublists(decl: &Declaration, initial: Option<&str>) -> Result<Vec<SubList>, LuError> {
    let mut sublists: Vec<SubList> = Vec::new();
    if let Some(canonical) = initial {
        sublists.push(SubList {
            canonical_form: canonical.to_owned(),
            synonyms: Vec::new(),
        });
    }

    let inline = decl
        .inline
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|text| BodyLine {
            text: text.to_owned(),
            prov: decl.prov.clone(),
        });

    for line in inline.iter().chain(decl.lines.iter()) {
        let text = line.text.trim();
        if let Some(canonical) = text.strip_suffix(':') {
            sublists.push(SubList {
                canonical_form: canonical.trim().to_owned(),
                synonyms: Vec::new(),
            });
            continue;
        }
        match sublists.last_mut() {
            Some(current) => {
                if !current.synonyms.iter().any(|s| s == text) {
                    current.synonyms.push(text.to_owned());
                }
            }
            None => {
                return Err(LuError::at(
                    ErrorCode::SynonymsNotAList,
                    &line.prov,
                    format!(
                        "synonym '{}' of list entity '{}' must follow a 'value:' line",
                        text, decl.name
                    ),
                ))
            }
        }
    }
    Ok(sublists)
}

fn merge_sublist(existing: &mut Vec<SubList>, incoming: SubList) {
    match existing
        .iter()
        .position(|s| s.canonical_form == incoming.canonical_form)
    {
        Some(i) => {
            let target = &mut existing[i].synonyms;
            for synonym in incoming.synonyms {
                if !target.contains(&synonym) {
                    target.push(synonym);
                }
            }
        }
        None => existing.push(incoming),
    }
}

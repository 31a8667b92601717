use super::{declare, Declaration};
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, EntityRecord, LuisApp};

pub(super) fn declare_composite(app: &mut LuisApp, decl: &Declaration) -> Result<(), LuError> {
    let children = parse_children(decl);
    let required = decl.has_definition() || decl.roles.is_empty();
    if required && children.is_empty() {
        return Err(decl.invalid(
            ErrorCode::InvalidCompositeEntity,
            format!(
                "composite entity '{}' must list its child entities, e.g. '[child1, child2]'",
                decl.name
            ),
        ));
    }

    if let Some(EntityRecord::Composite { children: existing, .. }) = app.registry.get(decl.name) {
        if !existing.is_empty() && !children.is_empty() && !same_set(existing, &children) {
            return Err(decl.invalid(
                ErrorCode::InvalidCompositeEntity,
                format!(
                    "composite entity '{}' is already defined with children [{}]; redefinition with [{}] is not allowed",
                    decl.name,
                    existing.join(", "),
                    children.join(", ")
                ),
            ));
        }
    }

    let record = declare(app, EntityKind::Composite, decl.name, &decl.roles, decl.prov)?;
    if let EntityRecord::Composite { children: existing, .. } = record {
        if existing.is_empty() {
            *existing = children;
        }
    }
    Ok(())
}

/// `[a, b]` inline, optionally continued on body lines.
fn parse_children(decl: &Declaration) -> Vec<String> {
    let mut children: Vec<String> = Vec::new();
    for item in super::body_items(decl) {
        let child = item.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace());
        if !child.is_empty() && !children.iter().any(|c| c == child) {
            children.push(child.to_owned());
        }
    }
    children
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x))
}

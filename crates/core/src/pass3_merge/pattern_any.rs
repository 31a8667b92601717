use super::{declare, Declaration};
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, LuisApp};

pub(super) fn declare_pattern_any(app: &mut LuisApp, decl: &Declaration) -> Result<(), LuError> {
    if decl.has_body() {
        return Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!("pattern.any entity '{}' cannot have a definition", decl.name),
        ));
    }
    declare(app, EntityKind::PatternAny, decl.name, &decl.roles, decl.prov)?;
    Ok(())
}

use super::{declare, Declaration, MergeContext};
use crate::error::{ErrorCode, LuError, Warnings};
use crate::model::{EntityKind, LuisApp};
use crate::prebuilt::{self, Availability, PREBUILT_TYPES};

/// The declared name is the builtin type. Locale availability may skip
/// the declaration (verbose) or remap it to a locale-specific type.
pub(super) fn declare_prebuilt(
    app: &mut LuisApp,
    decl: &Declaration,
    ctx: &MergeContext,
    warnings: &mut Warnings,
) -> Result<(), LuError> {
    if decl.has_body() {
        return Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!("prebuilt entity '{}' cannot have a definition", decl.name),
        ));
    }

    let Some(canonical) = prebuilt::lookup(decl.name) else {
        return Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!(
                "'{}' is not a prebuilt entity type. Valid types are: {}",
                decl.name,
                PREBUILT_TYPES.join(", ")
            ),
        ));
    };

    let name = match prebuilt::availability(ctx.locale, canonical) {
        Availability::Available(name) => name,
        Availability::Unavailable => {
            let message = format!(
                "prebuilt entity '{}' is not available for locale '{}'",
                canonical, ctx.locale
            );
            if !warnings.is_verbose() {
                return Err(decl.invalid(ErrorCode::InvalidInput, message));
            }
            warnings.warn(
                ErrorCode::InvalidInput,
                decl.prov.line,
                format!("{}; skipping declaration", message),
            );
            return Ok(());
        }
    };

    if name != canonical {
        warnings.warn(
            ErrorCode::InvalidInput,
            decl.prov.line,
            format!(
                "prebuilt entity '{}' is mapped to '{}' for locale '{}'",
                canonical, name, ctx.locale
            ),
        );
    }

    declare(app, EntityKind::Prebuilt, name, &decl.roles, decl.prov)?;
    Ok(())
}

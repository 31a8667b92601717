use super::{declare, Declaration};
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, LuisApp};

pub(super) fn declare_simple(app: &mut LuisApp, decl: &Declaration) -> Result<(), LuError> {
    if decl.has_body() {
        return Err(decl.invalid(
            ErrorCode::InvalidInput,
            format!("simple entity '{}' cannot have a definition", decl.name),
        ));
    }
    declare(app, EntityKind::Simple, decl.name, &decl.roles, decl.prov)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::run;
    use crate::error::ErrorCode;
    use crate::model::EntityKind;

    #[test]
    fn redeclaration_unions_roles() {
        let app = run("@ simple s hasRoles a, b\n@ simple s hasRoles b c\n").unwrap();
        let record = app.registry.get("s").unwrap();
        assert_eq!(record.kind(), EntityKind::Simple);
        assert_eq!(record.roles().as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn body_is_rejected() {
        let err = run("@ simple s = x\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn promotes_pattern_any_with_its_roles() {
        let app = run("# Book\n- book {room:r1}\n@ simple room hasRoles r2\n").unwrap();
        let record = app.registry.get("room").unwrap();
        assert_eq!(record.kind(), EntityKind::Simple);
        assert_eq!(record.roles().as_slice(), ["r1", "r2"]);
    }

    #[test]
    fn ml_is_an_alias_for_simple() {
        let app = run("@ ml name\n").unwrap();
        assert_eq!(app.registry.kind_of("name"), Some(EntityKind::Simple));
    }
}

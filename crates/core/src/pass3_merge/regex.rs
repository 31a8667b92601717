use super::{declare, Declaration};
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, EntityRecord, LuisApp};

pub(super) fn declare_regex(app: &mut LuisApp, decl: &Declaration) -> Result<(), LuError> {
    let inline_given = decl.inline.is_some_and(|inline| !inline.trim().is_empty());
    if (inline_given && !decl.lines.is_empty()) || decl.lines.len() > 1 {
        return Err(decl.invalid(
            ErrorCode::InvalidRegexEntity,
            format!(
                "regex entity '{}' takes exactly one pattern, either inline or on one body line",
                decl.name
            ),
        ));
    }
    // The pattern may also sit on the first body line.
    let source = decl
        .inline
        .map(|inline| match (inline.trim(), decl.lines.first()) {
            ("", Some(line)) => line.text.as_str(),
            (text, _) => text,
        });
    let pattern = match source {
        Some(text) => Some(parse_pattern(decl, text)?),
        None => None,
    };

    if let (Some(new), Some(EntityRecord::Regex { pattern: existing, .. })) =
        (&pattern, app.registry.get(decl.name))
    {
        if !existing.is_empty() && existing != new {
            return Err(decl.invalid(
                ErrorCode::InvalidRegexEntity,
                format!(
                    "regex entity '{}' is already defined with pattern /{}/; redefinition with /{}/ is not allowed",
                    decl.name, existing, new
                ),
            ));
        }
    }

    let record = declare(app, EntityKind::Regex, decl.name, &decl.roles, decl.prov)?;
    if let (Some(new), EntityRecord::Regex { pattern: existing, .. }) = (pattern, record) {
        if existing.is_empty() {
            *existing = new;
        }
    }
    Ok(())
}

/// `/pattern/` → `pattern`. Empty or undelimited patterns are rejected.
fn parse_pattern(decl: &Declaration, inline: &str) -> Result<String, LuError> {
    let text = inline.trim();
    let body = text
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|body| !body.is_empty());
    match body {
        Some(body) => Ok(body.to_owned()),
        None => Err(decl.invalid(
            ErrorCode::InvalidRegexEntity,
            format!(
                "regex entity '{}' needs a non-empty pattern delimited by slashes, e.g. /[0-9]+/",
                decl.name
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::run;
    use crate::error::ErrorCode;
    use crate::model::EntityRecord;

    fn pattern(app: &crate::model::LuisApp, name: &str) -> String {
        match app.registry.get(name) {
            Some(EntityRecord::Regex { pattern, .. }) => pattern.clone(),
            other => panic!("Expected regex, got {:?}", other),
        }
    }

    #[test]
    fn first_pattern_wins_and_roles_merge() {
        let app = run("@ regex hrf hasRoles a\n@ regex hrf = /hrf-[0-9]{6}/\n@ regex hrf hasRoles b = /hrf-[0-9]{6}/\n")
            .unwrap();
        assert_eq!(pattern(&app, "hrf"), "hrf-[0-9]{6}");
        assert_eq!(app.registry.get("hrf").unwrap().roles().as_slice(), ["a", "b"]);
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let err = run("@ regex r = //\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRegexEntity);
        let err = run("@ regex r =\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRegexEntity);
    }

    #[test]
    fn pattern_on_body_line() {
        let app = run("@ regex r =\n- /[a-z]+/\n").unwrap();
        assert_eq!(pattern(&app, "r"), "[a-z]+");
    }

    #[test]
    fn extra_body_lines_are_rejected() {
        let err = run("@ regex r = /a/\n- /b/\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRegexEntity);
        let err = run("@ regex r =\n- /a/\n- /b/\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRegexEntity);
    }

    #[test]
    fn conflicting_pattern_is_rejected() {
        let err = run("$r:/a+/\n$r:/b+/\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRegexEntity);
        assert_eq!(err.line, 2);
    }
}

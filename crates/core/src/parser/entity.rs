//! `@ <type> <name> ...` declaration headers.

use crate::ast::{EntityDefinition, NewEntitySection, Provenance};

/// Parsed header plus an optional warning for ignored trailing clauses.
pub(crate) struct Header {
    pub section: NewEntitySection,
    pub warning: Option<String>,
}

pub(crate) fn parse_new_entity(text: &str, prov: Provenance) -> Result<Header, String> {
    let (head, definition) = match text.split_once('=') {
        Some((head, inline)) => (
            head,
            Some(EntityDefinition {
                inline: inline.trim().to_owned(),
                lines: Vec::new(),
            }),
        ),
        None => (text, None),
    };

    let mut words = head.split_whitespace();
    let entity_type = words
        .next()
        .ok_or_else(|| "missing entity type after '@'".to_owned())?
        .to_owned();
    let raw_name = words
        .next()
        .ok_or_else(|| format!("missing entity name after '@ {}'", entity_type))?;

    let mut interchangeable = false;
    let name = match raw_name.split_once('(') {
        Some((name, flag)) => {
            interchangeable = parse_flag(flag)?;
            name
        }
        None => raw_name,
    };
    if name.is_empty() {
        return Err(format!("missing entity name after '@ {}'", entity_type));
    }

    let mut roles = Vec::new();
    let mut warning = None;
    let rest: Vec<&str> = words.collect();
    let mut rest = rest.as_slice();

    if let Some(first) = rest.first() {
        if first.starts_with('(') {
            interchangeable = parse_flag(&first[1..])?;
            rest = &rest[1..];
        }
    }
    if let Some(first) = rest.first() {
        if first.eq_ignore_ascii_case("hasroles") || first.eq_ignore_ascii_case("hasrole") {
            rest = &rest[1..];
        }
    }
    for (i, word) in rest.iter().enumerate() {
        let lower = word.to_ascii_lowercase();
        if lower == "usesfeature" || lower == "usesfeatures" {
            warning = Some(format!(
                "feature clause '{}' on entity '{}' is not supported and was ignored",
                rest[i..].join(" "),
                name
            ));
            break;
        }
        roles.extend(
            word.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_owned),
        );
    }

    Ok(Header {
        section: NewEntitySection {
            entity_type,
            name: name.to_owned(),
            roles,
            interchangeable,
            definition,
            prov,
        },
        warning,
    })
}

/// Body of a `(...)` flag; only `interchangeable` is recognized.
fn parse_flag(flag: &str) -> Result<bool, String> {
    let flag = flag.trim_end_matches(')').trim();
    if flag.eq_ignore_ascii_case("interchangeable") {
        Ok(true)
    } else {
        Err(format!("unknown entity flag '({})'", flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prov() -> Provenance {
        Provenance {
            file: "t.lu".into(),
            line: 1,
            text: String::new(),
        }
    }

    #[test]
    fn bare_roles_after_name() {
        let h = parse_new_entity("simple s1 sr1", prov()).unwrap();
        assert_eq!(h.section.entity_type, "simple");
        assert_eq!(h.section.name, "s1");
        assert_eq!(h.section.roles, vec!["sr1"]);
        assert!(h.section.definition.is_none());
    }

    #[test]
    fn has_roles_keyword_and_definition() {
        let h = parse_new_entity("list l1 hasRoles lr1,lr2 =", prov()).unwrap();
        assert_eq!(h.section.roles, vec!["lr1", "lr2"]);
        let def = h.section.definition.unwrap();
        assert_eq!(def.inline, "");
    }

    #[test]
    fn roles_separated_by_comma_and_space() {
        let h = parse_new_entity("prebuilt datetimeV2 hasRoles from, to", prov()).unwrap();
        assert_eq!(h.section.roles, vec!["from", "to"]);
    }

    #[test]
    fn interchangeable_flag() {
        let h = parse_new_entity("phraselist pl(interchangeable) =", prov()).unwrap();
        assert_eq!(h.section.name, "pl");
        assert!(h.section.interchangeable);

        let h = parse_new_entity("phraselist pl (interchangeable) =", prov()).unwrap();
        assert!(h.section.interchangeable);

        assert!(parse_new_entity("phraselist pl(weird) =", prov()).is_err());
    }

    #[test]
    fn inline_regex_keeps_equals_signs() {
        let h = parse_new_entity("regex r = /a=b/", prov()).unwrap();
        assert_eq!(h.section.definition.unwrap().inline, "/a=b/");
    }

    #[test]
    fn feature_clause_is_ignored_with_warning() {
        let h = parse_new_entity("ml m usesFeature f1", prov()).unwrap();
        assert!(h.section.roles.is_empty());
        assert!(h.warning.is_some());
    }

    #[test]
    fn missing_name_fails() {
        assert!(parse_new_entity("simple", prov()).is_err());
        assert!(parse_new_entity("", prov()).is_err());
    }
}

//! Builtin (prebuilt) entity catalog and per-locale availability.

/// Every prebuilt type the DSL accepts, in canonical spelling.
pub const PREBUILT_TYPES: &[&str] = &[
    "age",
    "datetime",
    "datetimeV2",
    "dimension",
    "email",
    "geographyV2",
    "keyPhrase",
    "money",
    "number",
    "ordinal",
    "ordinalV2",
    "percentage",
    "personName",
    "phonenumber",
    "temperature",
    "url",
];

/// Locale used when the requested one has no table of its own.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Canonical spelling of a prebuilt type, matched case-insensitively.
pub fn lookup(type_name: &str) -> Option<&'static str> {
    PREBUILT_TYPES
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(type_name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Available under this (possibly substituted) type name.
    Available(&'static str),
    Unavailable,
}

struct LocaleTable {
    locale: &'static str,
    unavailable: &'static [&'static str],
    substitutions: &'static [(&'static str, &'static str)],
}

const DATETIME_V2: &[(&str, &str)] = &[("datetime", "datetimeV2")];

static LOCALES: &[LocaleTable] = &[
    LocaleTable {
        locale: "en-us",
        unavailable: &[],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "en-gb",
        unavailable: &["personName"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "fr-fr",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "fr-ca",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "de-de",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "it-it",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "es-es",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "es-mx",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "pt-br",
        unavailable: &["personName", "ordinalV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "nl-nl",
        unavailable: &["personName", "ordinalV2", "geographyV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "tr-tr",
        unavailable: &["personName", "ordinalV2", "geographyV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "zh-cn",
        unavailable: &["personName", "ordinalV2", "geographyV2"],
        substitutions: DATETIME_V2,
    },
    LocaleTable {
        locale: "ja-jp",
        unavailable: &["personName", "ordinalV2", "geographyV2", "keyPhrase"],
        substitutions: &[("datetimeV2", "datetime")],
    },
    LocaleTable {
        locale: "ko-kr",
        unavailable: &["personName", "ordinalV2", "geographyV2", "keyPhrase"],
        substitutions: &[("datetimeV2", "datetime")],
    },
];

fn table(locale: &str) -> &'static LocaleTable {
    LOCALES
        .iter()
        .find(|t| t.locale.eq_ignore_ascii_case(locale))
        .or_else(|| LOCALES.iter().find(|t| t.locale == DEFAULT_LOCALE))
        .unwrap_or(&LOCALES[0])
}

/// Whether a canonical prebuilt type exists in `locale`, and under which
/// name. Unknown locales use the `en-us` table.
pub fn availability(locale: &str, type_name: &str) -> Availability {
    let t = table(locale);
    if t.unavailable.contains(&type_name) {
        return Availability::Unavailable;
    }
    let mapped = t
        .substitutions
        .iter()
        .find(|(from, _)| *from == type_name)
        .map(|(_, to)| *to);
    match mapped.or_else(|| lookup(type_name)) {
        Some(name) => Availability::Available(name),
        None => Availability::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("DATETIMEV2"), Some("datetimeV2"));
        assert_eq!(lookup("nope"), None);
    }

    #[test]
    fn generic_datetime_is_substituted() {
        assert_eq!(
            availability("en-us", "datetime"),
            Availability::Available("datetimeV2")
        );
        assert_eq!(
            availability("ja-jp", "datetimeV2"),
            Availability::Available("datetime")
        );
    }

    #[test]
    fn locale_specific_gaps() {
        assert_eq!(availability("en-us", "personName"), Availability::Available("personName"));
        assert_eq!(availability("de-de", "personName"), Availability::Unavailable);
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        assert_eq!(
            availability("xx-yy", "personName"),
            Availability::Available("personName")
        );
    }
}

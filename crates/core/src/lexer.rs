//! Line classifier. The DSL is line-oriented, so tokens are whole lines.

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    Comment,
    /// Text after `> !#`
    ModelInfo(String),
    IntentHeader(String),
    /// `# ? question`
    QnaHeader(String),
    /// Text after the `-`, `*` or `+` marker
    Bullet(String),
    /// Text after the leading `@`
    NewEntity(String),
    LegacyEntity {
        name: String,
        type_string: String,
    },
    Import {
        description: String,
        path: String,
    },
    /// `**Filters:**`
    FilterHeader,
    /// ``` with optional info string
    Fence,
    Other,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub kind: LineKind,
    pub line: u32,
    /// Untrimmed source text (minus the line terminator).
    pub raw: String,
}

pub fn lex(src: &str) -> Vec<Line> {
    src.lines()
        .enumerate()
        .map(|(i, raw)| Line {
            kind: classify(raw),
            line: i as u32 + 1,
            raw: raw.to_owned(),
        })
        .collect()
}

fn classify(raw: &str) -> LineKind {
    let t = raw.trim();
    if t.is_empty() {
        return LineKind::Blank;
    }

    if let Some(rest) = t.strip_prefix('>') {
        return match rest.trim_start().strip_prefix("!#") {
            Some(directive) => LineKind::ModelInfo(directive.trim().to_owned()),
            None => LineKind::Comment,
        };
    }

    if t.starts_with("```") {
        return LineKind::Fence;
    }

    if t.eq_ignore_ascii_case("**filters:**") {
        return LineKind::FilterHeader;
    }

    if t.starts_with('#') {
        let header = t.trim_start_matches('#').trim();
        return match header.strip_prefix('?') {
            Some(question) => LineKind::QnaHeader(question.trim().to_owned()),
            None if header.is_empty() => LineKind::Other,
            None => LineKind::IntentHeader(header.to_owned()),
        };
    }

    if let Some(rest) = strip_bullet(t) {
        return LineKind::Bullet(rest.trim().to_owned());
    }

    if let Some(rest) = t.strip_prefix('@') {
        return LineKind::NewEntity(rest.trim().to_owned());
    }

    if let Some(rest) = t.strip_prefix('$') {
        return match rest.split_once(':') {
            Some((name, type_string)) if !name.trim().is_empty() => LineKind::LegacyEntity {
                name: name.trim().to_owned(),
                type_string: type_string.trim().to_owned(),
            },
            _ => LineKind::Other,
        };
    }

    if let Some((description, path)) = import_link(t) {
        return LineKind::Import { description, path };
    }

    LineKind::Other
}

fn strip_bullet(t: &str) -> Option<&str> {
    let mut chars = t.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '*' | '+') {
        return None;
    }
    let rest = chars.as_str();
    // "**Filters:**" and "--" style rules are not bullets.
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// `[description](path)` occupying the whole line.
fn import_link(t: &str) -> Option<(String, String)> {
    let inner = t.strip_prefix('[')?.strip_suffix(')')?;
    let (description, path) = inner.split_once("](")?;
    if path.trim().is_empty() {
        return None;
    }
    Some((description.trim().to_owned(), path.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<LineKind> {
        lex(src).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn classifies_section_headers() {
        assert_eq!(
            kinds("# Greeting\n## ? what is it\n#\n"),
            vec![
                LineKind::IntentHeader("Greeting".into()),
                LineKind::QnaHeader("what is it".into()),
                LineKind::Other,
            ]
        );
    }

    #[test]
    fn model_info_and_comments() {
        assert_eq!(
            kinds("> a comment\n> !# @app.culture = en-us"),
            vec![
                LineKind::Comment,
                LineKind::ModelInfo("@app.culture = en-us".into()),
            ]
        );
    }

    #[test]
    fn bullets_require_whitespace_after_marker() {
        assert_eq!(
            kinds("- hi\n* there\n+ you\n-nope\n**Filters:**"),
            vec![
                LineKind::Bullet("hi".into()),
                LineKind::Bullet("there".into()),
                LineKind::Bullet("you".into()),
                LineKind::Other,
                LineKind::FilterHeader,
            ]
        );
    }

    #[test]
    fn entity_lines() {
        assert_eq!(
            kinds("@ simple s1 sr1\n$city:Seattle=\n$:bad"),
            vec![
                LineKind::NewEntity("simple s1 sr1".into()),
                LineKind::LegacyEntity {
                    name: "city".into(),
                    type_string: "Seattle=".into()
                },
                LineKind::Other,
            ]
        );
    }

    #[test]
    fn import_links() {
        assert_eq!(
            kinds("[more](./other.lu)\n[empty]()"),
            vec![
                LineKind::Import {
                    description: "more".into(),
                    path: "./other.lu".into()
                },
                LineKind::Other,
            ]
        );
    }

    #[test]
    fn line_numbers_are_one_based() {
        let lines = lex("\n# A\n");
        assert_eq!(lines[1].line, 2);
        assert_eq!(lines[1].raw, "# A");
    }
}

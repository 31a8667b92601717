//! Utterance text → span tree of text and (possibly nested) entity labels.

use crate::ast::{LabelNode, UtteranceNode};

/// Parse one utterance. Errors are plain messages; the caller attaches
/// the line.
pub(crate) fn parse_utterance(text: &str) -> Result<Vec<UtteranceNode>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0usize;
    parse_nodes(&chars, &mut pos, false)
}

fn parse_nodes(
    chars: &[char],
    pos: &mut usize,
    in_label: bool,
) -> Result<Vec<UtteranceNode>, String> {
    let mut nodes = Vec::new();
    let mut buf = String::new();

    while *pos < chars.len() {
        match chars[*pos] {
            '\\' if matches!(chars.get(*pos + 1), Some('{' | '}' | '\\')) => {
                buf.push(chars[*pos + 1]);
                *pos += 2;
            }
            '{' => {
                if !buf.is_empty() {
                    nodes.push(UtteranceNode::Text(std::mem::take(&mut buf)));
                }
                *pos += 1;
                nodes.push(UtteranceNode::Label(parse_label(chars, pos)?));
            }
            '}' => {
                if in_label {
                    // closing brace belongs to the enclosing label
                    break;
                }
                return Err("unbalanced '}' in utterance".to_owned());
            }
            c => {
                buf.push(c);
                *pos += 1;
            }
        }
    }

    if in_label && *pos >= chars.len() {
        return Err("unterminated '{' in utterance".to_owned());
    }
    if !buf.is_empty() {
        nodes.push(UtteranceNode::Text(buf));
    }
    Ok(nodes)
}

fn parse_label(chars: &[char], pos: &mut usize) -> Result<LabelNode, String> {
    let mut head = String::new();
    let value = loop {
        match chars.get(*pos) {
            None => return Err("unterminated '{' in utterance".to_owned()),
            Some('=') => {
                *pos += 1;
                let value = parse_nodes(chars, pos, true)?;
                // parse_nodes stopped on the closing brace
                *pos += 1;
                break Some(value);
            }
            Some('}') => {
                *pos += 1;
                break None;
            }
            Some('{') => {
                return Err(format!(
                    "unexpected '{{' inside entity reference '{{{}'",
                    head
                ))
            }
            Some(c) => {
                head.push(*c);
                *pos += 1;
            }
        }
    };

    let head = head.trim();
    let (at_reference, head) = match head.strip_prefix('@') {
        Some(rest) => (true, rest.trim()),
        None => (false, head),
    };
    let (entity, role) = match head.split_once(':') {
        Some((entity, role)) => (entity.trim(), Some(role.trim())),
        None => (head, None),
    };
    if entity.is_empty() {
        return Err("missing entity name in '{}' reference".to_owned());
    }
    if role == Some("") {
        return Err(format!("missing role name after '{}:'", entity));
    }

    Ok(LabelNode {
        entity: entity.to_owned(),
        role: role.map(str::to_owned),
        at_reference,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> UtteranceNode {
        UtteranceNode::Text(s.to_owned())
    }

    fn label(entity: &str, role: Option<&str>, value: Option<Vec<UtteranceNode>>) -> UtteranceNode {
        UtteranceNode::Label(LabelNode {
            entity: entity.to_owned(),
            role: role.map(str::to_owned),
            at_reference: false,
            value,
        })
    }

    #[test]
    fn plain_text_is_one_node() {
        assert_eq!(parse_utterance("hello there").unwrap(), vec![text("hello there")]);
    }

    #[test]
    fn labelled_value_with_role() {
        assert_eq!(
            parse_utterance("fly to {city:to=Seattle} now").unwrap(),
            vec![
                text("fly to "),
                label("city", Some("to"), Some(vec![text("Seattle")])),
                text(" now"),
            ]
        );
    }

    #[test]
    fn placeholder_without_value() {
        assert_eq!(
            parse_utterance("book {room}").unwrap(),
            vec![text("book "), label("room", None, None)]
        );
    }

    #[test]
    fn at_reference_is_flagged() {
        let nodes = parse_utterance("{@from}").unwrap();
        match &nodes[0] {
            UtteranceNode::Label(l) => {
                assert!(l.at_reference);
                assert_eq!(l.entity, "from");
            }
            other => panic!("expected label, got {:?}", other),
        }
    }

    #[test]
    fn nested_labels_build_a_tree() {
        assert_eq!(
            parse_utterance("hi {userName=foo {firstName=bar}}").unwrap(),
            vec![
                text("hi "),
                label(
                    "userName",
                    None,
                    Some(vec![
                        text("foo "),
                        label("firstName", None, Some(vec![text("bar")])),
                    ])
                ),
            ]
        );
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert_eq!(parse_utterance(r"a \{b\} c").unwrap(), vec![text("a {b} c")]);
    }

    #[test]
    fn empty_value_is_kept_for_later_validation() {
        assert_eq!(
            parse_utterance("x {a=}").unwrap(),
            vec![text("x "), label("a", None, Some(vec![]))]
        );
    }

    #[test]
    fn unbalanced_braces_fail() {
        assert!(parse_utterance("a {b=c").is_err());
        assert!(parse_utterance("a b}").is_err());
        assert!(parse_utterance("a {b").is_err());
        assert!(parse_utterance("a {:r=x}").is_err());
        assert!(parse_utterance("a {e:=x}").is_err());
    }
}

//! Nested label flattening.
//!
//! A post-order walk over an utterance's span tree that produces the
//! final plain text and label spans over that text. Nested labels are
//! reported separately so the caller can register their entities; their
//! text is absorbed into the enclosing label.

use crate::ast::{LabelNode, UtteranceNode};

/// A label span over the flattened text. Offsets count characters;
/// `end` is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatLabel {
    pub entity: String,
    pub role: Option<String>,
    pub at_reference: bool,
    /// `false` for value-less placeholders, whose span covers the
    /// placeholder text itself.
    pub has_value: bool,
    pub start: usize,
    pub end: usize,
}

impl FlatLabel {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatUtterance {
    /// Trimmed plain text.
    pub text: String,
    /// Top-level labels in source order.
    pub labels: Vec<FlatLabel>,
    /// Labels found inside other labels' values, innermost first.
    pub nested: Vec<FlatLabel>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlattenError {
    #[error("entity '{inner}' is nested inside the labelled value of '{outer}', and nested labels are not allowed")]
    NestingDisallowed { outer: String, inner: String },

    #[error("'{{{inner}}}' has no value and cannot appear inside the labelled value of '{outer}'")]
    PlaceholderInValue { outer: String, inner: String },
}

struct Builder {
    text: String,
    chars: usize,
    found: Vec<(usize, FlatLabel)>,
    allow_nested: bool,
}

impl Builder {
    fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.chars += s.chars().count();
    }

    fn walk(&mut self, nodes: &[UtteranceNode], parent: Option<&str>, depth: usize) -> Result<(), FlattenError> {
        for node in nodes {
            match node {
                UtteranceNode::Text(t) => self.push_str(t),
                UtteranceNode::Label(label) => self.label(label, parent, depth)?,
            }
        }
        Ok(())
    }

    fn label(&mut self, label: &LabelNode, parent: Option<&str>, depth: usize) -> Result<(), FlattenError> {
        let start = self.chars;
        let has_value = match (&label.value, parent) {
            (None, Some(outer)) => {
                return Err(FlattenError::PlaceholderInValue {
                    outer: outer.to_owned(),
                    inner: label.entity.clone(),
                })
            }
            (Some(_), Some(outer)) if !self.allow_nested => {
                return Err(FlattenError::NestingDisallowed {
                    outer: outer.to_owned(),
                    inner: label.entity.clone(),
                })
            }
            (Some(children), _) => {
                self.walk(children, Some(&label.entity), depth + 1)?;
                true
            }
            (None, None) => {
                let placeholder = placeholder_text(label);
                self.push_str(&placeholder);
                false
            }
        };
        self.found.push((
            depth,
            FlatLabel {
                entity: label.entity.clone(),
                role: label.role.clone(),
                at_reference: label.at_reference,
                has_value,
                start,
                end: self.chars,
            },
        ));
        Ok(())
    }
}

/// `{name}`, `{name:role}` or `{@name}`, as written.
pub(crate) fn placeholder_text(label: &LabelNode) -> String {
    let at = if label.at_reference { "@" } else { "" };
    match &label.role {
        Some(role) => format!("{{{}{}:{}}}", at, label.entity, role),
        None => format!("{{{}{}}}", at, label.entity),
    }
}

/// Flatten a span tree into text plus label spans.
pub fn flatten(nodes: &[UtteranceNode], allow_nested: bool) -> Result<FlatUtterance, FlattenError> {
    let mut b = Builder {
        text: String::new(),
        chars: 0,
        found: Vec::new(),
        allow_nested,
    };
    b.walk(nodes, None, 0)?;

    // Trim, shifting every span by the leading whitespace removed.
    let leading = b.text.chars().take_while(|c| c.is_whitespace()).count();
    let text = b.text.trim().to_owned();
    let len = text.chars().count();
    let shift = |mut l: FlatLabel| {
        l.start = l.start.saturating_sub(leading).min(len);
        l.end = l.end.saturating_sub(leading).min(len);
        l
    };

    let mut labels = Vec::new();
    let mut nested = Vec::new();
    for (depth, label) in b.found {
        if depth == 0 {
            labels.push(shift(label));
        } else {
            nested.push(shift(label));
        }
    }
    Ok(FlatUtterance {
        text,
        labels,
        nested,
    })
}

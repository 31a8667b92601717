//! Line-oriented front end: classified lines → `SyntaxResource`.
//!
//! Recovery is per line: a bad line produces an error diagnostic and the
//! parser carries on, so one run reports every syntax problem in the file.
//! No semantic checks happen here.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode};
use crate::lexer::{Line, LineKind};

mod entity;
mod utterance;

pub(crate) use utterance::parse_utterance;

/// What the next bullet line attaches to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Context {
    None,
    Intent,
    EntityBody,
    Qna { filters: bool, answered: bool },
}

struct Parser<'a> {
    lines: &'a [Line],
    pos: usize,
    filename: String,
    context: Context,
    sections: Vec<Section>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(lines: &'a [Line], filename: &str) -> Self {
        Parser {
            lines,
            pos: 0,
            filename: filename.to_owned(),
            context: Context::None,
            sections: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn prov(&self, line: &Line) -> Provenance {
        Provenance {
            file: self.filename.clone(),
            line: line.line,
            text: line.raw.clone(),
        }
    }

    fn error(&mut self, line: u32, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(ErrorCode::InvalidLine, line, message));
    }

    fn warn(&mut self, line: u32, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warn(ErrorCode::InvalidLine, line, message));
    }

    /// Switch to a new section, closing the current one.
    fn enter(&mut self, context: Context) {
        self.close_qna();
        self.context = context;
    }

    fn close_qna(&mut self) {
        if let Context::Qna {
            answered: false, ..
        } = self.context
        {
            if let Some(Section::Qna(q)) = self.sections.last() {
                let line = q.prov.line;
                let question = q.questions.first().cloned().unwrap_or_default();
                self.error(line, format!("no answer found for question '{}'", question));
            }
        }
    }

    fn parse_file(&mut self) {
        let lines = self.lines;
        while self.pos < lines.len() {
            let line = &lines[self.pos];
            self.pos += 1;
            match &line.kind {
                LineKind::Blank | LineKind::Comment => {}
                LineKind::ModelInfo(directive) => {
                    let prov = self.prov(line);
                    self.sections.push(Section::ModelInfo(ModelInfoLine {
                        directive: directive.clone(),
                        prov,
                    }));
                }
                LineKind::IntentHeader(name) => {
                    self.enter(Context::Intent);
                    let prov = self.prov(line);
                    self.sections.push(Section::Intent(IntentSection {
                        name: name.clone(),
                        utterances: Vec::new(),
                        prov,
                    }));
                }
                LineKind::QnaHeader(question) => {
                    self.enter(Context::Qna {
                        filters: false,
                        answered: false,
                    });
                    let prov = self.prov(line);
                    self.sections.push(Section::Qna(QnaSection {
                        questions: vec![question.clone()],
                        filters: Vec::new(),
                        answer: String::new(),
                        prov,
                    }));
                }
                LineKind::NewEntity(text) => self.parse_new_entity(line, text),
                LineKind::LegacyEntity { name, type_string } => {
                    self.enter(Context::EntityBody);
                    let prov = self.prov(line);
                    self.sections.push(Section::LegacyEntity(LegacyEntitySection {
                        name: name.clone(),
                        type_string: type_string.clone(),
                        lines: Vec::new(),
                        prov,
                    }));
                }
                LineKind::Import { description, path } => {
                    self.enter(Context::None);
                    let prov = self.prov(line);
                    self.sections.push(Section::Import(ImportSection {
                        description: description.clone(),
                        path: path.clone(),
                        prov,
                    }));
                }
                LineKind::Bullet(text) => self.parse_bullet(line, text),
                LineKind::FilterHeader => match self.context {
                    Context::Qna { answered, .. } => {
                        self.context = Context::Qna {
                            filters: true,
                            answered,
                        };
                    }
                    _ => self.error(line.line, "'**Filters:**' outside of a QnA section"),
                },
                LineKind::Fence => self.parse_answer(line),
                LineKind::Other => {
                    self.error(line.line, format!("invalid line '{}'", line.raw.trim()))
                }
            }
        }
        self.enter(Context::None);

        let empty_intents: Vec<(u32, String)> = self
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::Intent(i) if i.utterances.is_empty() => {
                    Some((i.prov.line, i.name.clone()))
                }
                _ => None,
            })
            .collect();
        for (line, name) in empty_intents {
            self.warn(line, format!("no utterances found for intent definition '# {}'", name));
        }
    }

    fn parse_new_entity(&mut self, line: &Line, text: &str) {
        let prov = self.prov(line);
        match entity::parse_new_entity(text, prov) {
            Ok(header) => {
                if let Some(w) = header.warning {
                    self.warn(line.line, w);
                }
                let context = if header.section.definition.is_some() {
                    Context::EntityBody
                } else {
                    Context::None
                };
                self.enter(context);
                self.sections.push(Section::NewEntity(header.section));
            }
            Err(msg) => {
                self.enter(Context::None);
                self.error(line.line, msg);
            }
        }
    }

    fn parse_bullet(&mut self, line: &Line, text: &str) {
        let prov = self.prov(line);
        match self.context {
            Context::Intent => match parse_utterance(text) {
                Ok(nodes) => {
                    if let Some(Section::Intent(intent)) = self.sections.last_mut() {
                        intent.utterances.push(UtteranceLine { nodes, prov });
                    }
                }
                Err(msg) => self.error(line.line, msg),
            },
            Context::EntityBody => {
                let body = BodyLine {
                    text: text.to_owned(),
                    prov,
                };
                match self.sections.last_mut() {
                    Some(Section::NewEntity(e)) => {
                        if let Some(def) = e.definition.as_mut() {
                            def.lines.push(body);
                        }
                    }
                    Some(Section::LegacyEntity(e)) => e.lines.push(body),
                    _ => {}
                }
            }
            Context::Qna { filters, answered } => {
                if answered {
                    self.error(line.line, "unexpected line after the answer of a QnA pair");
                } else if filters {
                    self.parse_filter(line, text);
                } else if let Some(Section::Qna(q)) = self.sections.last_mut() {
                    q.questions.push(text.to_owned());
                }
            }
            Context::None => self.error(
                line.line,
                format!(
                    "'{}' is not part of an intent, entity or QnA section",
                    line.raw.trim()
                ),
            ),
        }
    }

    fn parse_filter(&mut self, line: &Line, text: &str) {
        match text.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                if let Some(Section::Qna(q)) = self.sections.last_mut() {
                    q.filters
                        .push((key.trim().to_owned(), value.trim().to_owned()));
                }
            }
            _ => self.error(
                line.line,
                format!("invalid filter '{}': expected 'key = value'", text),
            ),
        }
    }

    /// Consume a fenced block as the current QnA pair's answer.
    fn parse_answer(&mut self, open: &Line) {
        let Context::Qna {
            filters,
            answered: false,
        } = self.context
        else {
            self.error(open.line, "code fence outside of a QnA answer");
            return;
        };

        let mut body = Vec::new();
        let mut closed = false;
        let lines = self.lines;
        while self.pos < lines.len() {
            let line = &lines[self.pos];
            self.pos += 1;
            if line.kind == LineKind::Fence {
                closed = true;
                break;
            }
            body.push(line.raw.as_str());
        }
        if !closed {
            self.error(open.line, "unterminated answer block");
        }
        if let Some(Section::Qna(q)) = self.sections.last_mut() {
            q.answer = body.join("\n").trim().to_owned();
        }
        self.context = Context::Qna {
            filters,
            answered: true,
        };
    }
}

/// Parse classified lines into a syntax resource. Never fails; problems
/// are reported as diagnostics.
pub fn parse(lines: &[Line], filename: &str) -> SyntaxResource {
    let mut p = Parser::new(lines, filename);
    p.parse_file();
    SyntaxResource {
        sections: p.sections,
        diagnostics: p.diagnostics,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

//! Parse pipeline: `.lu` / `.qna` text → consolidated model.
//!
//! A thin orchestrator that runs the front end and then each pass in
//! order. Syntax errors stop the file before any semantic pass runs.

use crate::config::ParseOptions;
use crate::error::{ErrorCode, LuError, Severity, Warnings};
use crate::model::ParsedContent;
use crate::prebuilt::DEFAULT_LOCALE;
use crate::source::{SourceProvider, UriProbe};
use crate::{lexer, parser};
use crate::{pass1_model_info, pass2_imports, pass3_merge, pass4_qna};
use std::path::Path;

/// Parse one file's text. Each call owns its own registry.
pub fn parse_content(
    src: &str,
    filename: &str,
    options: &ParseOptions,
    probe: &dyn UriProbe,
) -> Result<ParsedContent, LuError> {
    tracing::debug!(file = filename, "parsing");

    // Front end
    let resource = parser::parse(&lexer::lex(src), filename);
    let (errors, front_warnings): (Vec<_>, Vec<_>) = resource
        .diagnostics
        .iter()
        .cloned()
        .partition(|d| d.severity == Severity::Error);
    if !errors.is_empty() {
        return Err(LuError::from_diagnostics(filename, errors));
    }

    let mut warnings = Warnings::new(options.verbose);
    for w in front_warnings {
        warnings.push(w);
    }
    let mut content = ParsedContent::default();

    // Pass 1: model info
    pass1_model_info::apply_model_info(
        &resource.sections,
        &mut content.luis,
        &mut content.qna,
        &mut warnings,
    )?;

    let locale = options
        .culture
        .clone()
        .or_else(|| content.luis.settings.get("culture").cloned())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_owned())
        .to_ascii_lowercase();

    // Pass 2: imports
    pass2_imports::resolve_imports(
        &resource.sections,
        probe,
        &mut content.qna,
        &mut content.additional_files,
    )?;

    // Pass 3: entities and utterances
    let ctx = pass3_merge::MergeContext {
        locale: &locale,
        options,
    };
    pass3_merge::merge(
        &resource.sections,
        &mut content.luis,
        &mut content.qna,
        &ctx,
        &mut warnings,
    )?;

    // Pass 4: QnA pairs
    pass4_qna::build_qna(&resource.sections, &mut content.qna);

    content.warnings = warnings.into_vec();
    Ok(content)
}

/// Read `path` through `provider` and parse it.
pub fn parse_file(
    path: &Path,
    options: &ParseOptions,
    provider: &dyn SourceProvider,
    probe: &dyn UriProbe,
) -> Result<ParsedContent, LuError> {
    let filename = path.display().to_string();
    let src = provider.read_source(path).map_err(|e| {
        LuError::new(
            ErrorCode::InvalidInput,
            &filename,
            0,
            format!("cannot read file: {}", e),
        )
    })?;
    parse_content(&src, &filename, options, probe)
}

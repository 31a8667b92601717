use std::process;

use lu_core::{
    alterations_to_json, luis_to_json, parse_file, qna_to_json, FileSystemProvider, ParseOptions,
};
use serde_json::json;

use crate::{probe_for, report_lu_error, ModelKind, OutputFormat, SourceArgs};

pub(crate) fn cmd_parse(
    source: &SourceArgs,
    options: &ParseOptions,
    kind: ModelKind,
    output: OutputFormat,
    quiet: bool,
) {
    let probe = probe_for(source);
    let content = match parse_file(&source.file, options, &FileSystemProvider, probe.as_ref()) {
        Ok(content) => content,
        Err(e) => {
            report_lu_error(&e, output, quiet);
            process::exit(1);
        }
    };
    tracing::debug!(
        warnings = content.warnings.len(),
        additional_files = content.additional_files.len(),
        "parsed {}",
        source.file.display()
    );

    let value = match kind {
        ModelKind::Luis => luis_to_json(&content.luis),
        ModelKind::Qna => {
            let mut qna = qna_to_json(&content.qna);
            if let (Some(m), Some(alterations)) = (
                qna.as_object_mut(),
                alterations_to_json(&content.qna).get("wordAlterations").cloned(),
            ) {
                m.insert("wordAlterations".to_owned(), alterations);
            }
            qna
        }
        ModelKind::All => json!({
            "luis": luis_to_json(&content.luis),
            "qna": qna_to_json(&content.qna),
            "alterations": alterations_to_json(&content.qna),
            "additionalFiles": content.additional_files,
        }),
    };
    let pretty = serde_json::to_string_pretty(&value)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}

use std::process;

use lu_core::{parse_file, FileSystemProvider, ParseOptions};
use serde_json::json;

use crate::{probe_for, report_lu_error, OutputFormat, SourceArgs};

pub(crate) fn cmd_check(source: &SourceArgs, options: &ParseOptions, output: OutputFormat, quiet: bool) {
    let probe = probe_for(source);
    let content = match parse_file(&source.file, options, &FileSystemProvider, probe.as_ref()) {
        Ok(content) => content,
        Err(e) => {
            report_lu_error(&e, output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let report = json!({
                "status": "ok",
                "file": source.file.display().to_string(),
                "intents": content.luis.intents.len(),
                "entities": content.luis.registry.len(),
                "utterances": content.luis.utterances().len(),
                "patterns": content.luis.patterns().len(),
                "qnaPairs": content.qna.qna_list.len(),
                "warnings": content.warnings,
            });
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            println!(
                "ok: {} ({} intents, {} entities, {} utterances, {} patterns, {} QnA pairs)",
                source.file.display(),
                content.luis.intents.len(),
                content.luis.registry.len(),
                content.luis.utterances().len(),
                content.luis.patterns().len(),
                content.qna.qna_list.len()
            );
            for w in &content.warnings {
                println!("  warning: {}", w);
            }
        }
    }
}

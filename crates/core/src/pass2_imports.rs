//! Pass 2: import references (`[description](path)`).
//!
//! Web links are probed and filed under the KB as pages or documents;
//! local paths are handed back to the caller, never parsed here.

use crate::ast::{ImportSection, Section};
use crate::error::{ErrorCode, LuError};
use crate::model::{QnaFile, QnaKb};
use crate::source::UriProbe;

pub fn resolve_imports(
    sections: &[Section],
    probe: &dyn UriProbe,
    kb: &mut QnaKb,
    additional_files: &mut Vec<String>,
) -> Result<(), LuError> {
    for section in sections {
        if let Section::Import(import) = section {
            resolve_import(import, probe, kb, additional_files)?;
        }
    }
    Ok(())
}

fn resolve_import(
    import: &ImportSection,
    probe: &dyn UriProbe,
    kb: &mut QnaKb,
    additional_files: &mut Vec<String>,
) -> Result<(), LuError> {
    let path = import.path.as_str();
    if !is_web_link(path) {
        if !additional_files.iter().any(|f| f == path) {
            additional_files.push(path.to_owned());
        }
        return Ok(());
    }

    tracing::debug!(uri = path, "probing imported link");
    let content_type = probe.content_type(path).map_err(|reason| {
        LuError::at(
            ErrorCode::InvalidUri,
            &import.prov,
            format!("URI '{}' appears to be invalid: {}", path, reason),
        )
    })?;

    if content_type.to_ascii_lowercase().contains("text/html") {
        if !kb.urls.iter().any(|u| u == path) {
            kb.urls.push(path.to_owned());
        }
    } else if !kb.files.iter().any(|f| f.file_uri == path) {
        kb.files.push(QnaFile {
            file_uri: path.to_owned(),
            file_name: import.description.clone(),
        });
    }
    Ok(())
}

fn is_web_link(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

//! `--config` file loading.
//!
//! ```toml
//! [parse]
//! culture = "fr-fr"
//! verbose = false
//! allow_nested_labels = true
//! ```

use std::path::Path;

use lu_core::ParseOptions;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    parse: ParseOptions,
}

/// Read parse options from a TOML config file at `path`.
///
/// Returns a human-readable error string on failure.
pub(crate) fn read_options(path: &Path) -> Result<ParseOptions, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    parse_options(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

fn parse_options(content: &str) -> Result<ParseOptions, toml::de::Error> {
    toml::from_str::<ConfigFile>(content).map(|c| c.parse)
}

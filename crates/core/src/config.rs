//! Parse options. Deserializable so callers can load them from a config
//! file; every field has a default.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Overrides `@app.culture` for prebuilt availability checks.
    pub culture: Option<String>,
    /// Log warnings, and downgrade locale-unavailable prebuilt
    /// declarations from errors to skipped declarations.
    pub verbose: bool,
    /// Accept labels nested inside labelled values.
    pub allow_nested_labels: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            culture: None,
            verbose: false,
            allow_nested_labels: true,
        }
    }
}

impl ParseOptions {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn allow_nested_labels(mut self, allow: bool) -> Self {
        self.allow_nested_labels = allow;
        self
    }
}
